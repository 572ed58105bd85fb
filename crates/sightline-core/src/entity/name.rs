use unicode_general_category::{GeneralCategory, get_general_category};

/// Keep letters, decimal digits, punctuation and whitespace; drop everything else.
pub fn sanitize_name(raw: &str) -> String {
    raw.chars().filter(|&c| is_name_char(c)).collect()
}

fn is_name_char(c: char) -> bool {
    use GeneralCategory::*;

    c.is_whitespace()
        || matches!(
            get_general_category(c),
            UppercaseLetter
                | LowercaseLetter
                | TitlecaseLetter
                | ModifierLetter
                | OtherLetter
                | DecimalNumber
                | ConnectorPunctuation
                | DashPunctuation
                | OpenPunctuation
                | ClosePunctuation
                | InitialPunctuation
                | FinalPunctuation
                | OtherPunctuation
        )
}
