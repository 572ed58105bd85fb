use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SchemaError};
use crate::memory::layout::bones;
use crate::offset::{ClassesDocument, GlobalsDocument};

/// File the merged schema is persisted to
pub const SCHEMA_FILE: &str = "offsets.json";

/// Module every offset is resolved under
pub const MODULE: &str = "client.dll";

/// Resolved field offsets for the remote entity structures.
///
/// Field order and JSON names are the on-disk format of `offsets.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffsetSchema {
    #[serde(rename = "dwEntityList")]
    pub entity_list: u64,
    #[serde(rename = "dwLocalPlayerPawn")]
    pub local_player_pawn: u64,
    #[serde(rename = "dwViewMatrix")]
    pub view_matrix: u64,
    #[serde(rename = "m_hPlayerPawn")]
    pub player_pawn_handle: u64,
    #[serde(rename = "m_iHealth")]
    pub health: u64,
    #[serde(rename = "m_lifeState")]
    pub life_state: u64,
    #[serde(rename = "m_iTeamNum")]
    pub team: u64,
    #[serde(rename = "m_vOldOrigin")]
    pub origin: u64,
    #[serde(rename = "m_pGameSceneNode")]
    pub scene_node: u64,
    #[serde(rename = "m_modelState")]
    pub model_state: u64,
    #[serde(rename = "m_boneArray")]
    pub bone_array: u64,
    #[serde(rename = "m_nodeToWorld")]
    pub node_to_world: u64,
    #[serde(rename = "m_sSanitizedPlayerName")]
    pub player_name: u64,
}

impl OffsetSchema {
    /// Resolve every required offset from the two source documents.
    ///
    /// All missing or mistyped paths are collected into a single
    /// [`SchemaError::Unresolved`]; no partial schema is ever returned.
    pub fn resolve(
        globals: &GlobalsDocument,
        classes: &ClassesDocument,
    ) -> std::result::Result<Self, SchemaError> {
        let mut issues = Vec::new();
        let mut global = |key: &str| globals.lookup(MODULE, key, &mut issues);
        let entity_list = global("dwEntityList");
        let local_player_pawn = global("dwLocalPlayerPawn");
        let view_matrix = global("dwViewMatrix");

        let mut field = |class: &str, name: &str| classes.lookup(MODULE, class, name, &mut issues);
        let schema = Self {
            entity_list,
            local_player_pawn,
            view_matrix,
            player_pawn_handle: field("CCSPlayerController", "m_hPlayerPawn"),
            player_name: field("CCSPlayerController", "m_sSanitizedPlayerName"),
            origin: field("C_BasePlayerPawn", "m_vOldOrigin"),
            model_state: field("CSkeletonInstance", "m_modelState"),
            node_to_world: field("CGameSceneNode", "m_nodeToWorld"),
            health: field("C_BaseEntity", "m_iHealth"),
            life_state: field("C_BaseEntity", "m_lifeState"),
            team: field("C_BaseEntity", "m_iTeamNum"),
            scene_node: field("C_BaseEntity", "m_pGameSceneNode"),
            bone_array: bones::BONE_ARRAY_OFFSET,
        };

        if !issues.is_empty() {
            return Err(SchemaError::Unresolved(issues));
        }
        debug!(
            "Resolved schema: entity_list=0x{:X}, local_player_pawn=0x{:X}, view_matrix=0x{:X}",
            schema.entity_list, schema.local_player_pawn, schema.view_matrix
        );
        Ok(schema)
    }

    /// Parse both documents and resolve.
    pub fn from_documents(
        globals_json: &str,
        classes_json: &str,
    ) -> std::result::Result<Self, SchemaError> {
        let globals = GlobalsDocument::from_json(globals_json)?;
        let classes = ClassesDocument::from_json(classes_json)?;
        Self::resolve(&globals, &classes)
    }

    /// Global offsets are never zero in a usable schema.
    pub fn is_valid(&self) -> bool {
        self.entity_list != 0 && self.local_player_pawn != 0 && self.view_matrix != 0
    }

    /// Load a previously persisted schema
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let schema: OffsetSchema = serde_json::from_str(&content)?;
        if !schema.is_valid() {
            return Err(SchemaError::Invalid.into());
        }
        Ok(schema)
    }

    /// Persist to a specific path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content)?;
        info!("Saved offset schema to {}", path.as_ref().display());
        Ok(())
    }

    /// Reuse the schema persisted at `path`, or resolve it and persist the result.
    ///
    /// `resolve` is only invoked when no valid persisted schema exists, and its
    /// error is returned unchanged. Staleness of a persisted schema against a
    /// newer remote binary is not detected.
    pub fn load_or_resolve<P, F, E>(path: P, resolve: F) -> std::result::Result<Self, E>
    where
        P: AsRef<Path>,
        F: FnOnce() -> std::result::Result<Self, E>,
    {
        let path = path.as_ref();
        match Self::load_from_path(path) {
            Ok(schema) => {
                info!("Using persisted offset schema from {}", path.display());
                return Ok(schema);
            }
            Err(e) if e.is_not_found() => {
                debug!("No persisted schema at {}", path.display());
            }
            Err(e) => {
                warn!("Ignoring persisted schema at {}: {}", path.display(), e);
            }
        }

        let schema = resolve()?;
        if let Err(e) = schema.save_to_path(path) {
            warn!("Failed to persist offset schema: {}", e);
        }
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, SchemaIssue};
    use tempfile::NamedTempFile;

    const GLOBALS_JSON: &str = r#"{
        "client.dll": {"dwEntityList": 27000000, "dwLocalPlayerPawn": 26000000, "dwViewMatrix": 28000000},
        "engine2.dll": {"dwBuildNumber": 5400000}
    }"#;

    const CLASSES_JSON: &str = r#"{
        "client.dll": {
            "classes": {
                "CCSPlayerController": {"fields": {"m_hPlayerPawn": 2060, "m_sSanitizedPlayerName": 1904}},
                "C_BasePlayerPawn": {"fields": {"m_vOldOrigin": 4900}},
                "CSkeletonInstance": {"fields": {"m_modelState": 368}},
                "CGameSceneNode": {"fields": {"m_nodeToWorld": 16}},
                "C_BaseEntity": {"fields": {"m_iHealth": 836, "m_lifeState": 840, "m_iTeamNum": 995, "m_pGameSceneNode": 808}}
            }
        }
    }"#;

    #[test]
    fn test_resolve_all_fields() {
        let schema = OffsetSchema::from_documents(GLOBALS_JSON, CLASSES_JSON).unwrap();
        assert_eq!(schema.entity_list, 27000000);
        assert_eq!(schema.player_pawn_handle, 2060);
        assert_eq!(schema.team, 995);
        assert_eq!(schema.node_to_world, 16);
        assert_eq!(schema.bone_array, 128);
        assert!(schema.is_valid());
    }

    #[test]
    fn test_resolve_reports_every_missing_path() {
        let globals = r#"{"client.dll": {"dwEntityList": 1, "dwViewMatrix": "oops"}}"#;
        let classes = r#"{"client.dll": {"classes": {"C_BaseEntity": {"fields": {"m_iHealth": 836}}}}}"#;
        let err = OffsetSchema::from_documents(globals, classes).unwrap_err();

        let issues = match err {
            SchemaError::Unresolved(issues) => issues,
            other => panic!("expected unresolved schema, got {:?}", other),
        };
        let paths: Vec<&str> = issues.iter().map(SchemaIssue::path).collect();
        assert!(paths.contains(&"client.dll.dwLocalPlayerPawn"));
        assert!(paths.contains(&"client.dll.classes.CGameSceneNode.fields.m_nodeToWorld"));
        assert!(issues.contains(&SchemaIssue::NotANumber("client.dll.dwViewMatrix".to_string())));
        assert!(!paths.contains(&"client.dll.classes.C_BaseEntity.fields.m_iHealth"));
        // 1 missing global + 1 mistyped global + 8 missing fields
        assert_eq!(issues.len(), 10);
    }

    #[test]
    fn test_missing_module_fails() {
        let err = OffsetSchema::from_documents(r#"{"engine2.dll": {}}"#, CLASSES_JSON).unwrap_err();
        assert!(matches!(err, SchemaError::Unresolved(ref issues) if issues.len() == 3));
    }

    #[test]
    fn test_persisted_field_order() {
        let schema = OffsetSchema::from_documents(GLOBALS_JSON, CLASSES_JSON).unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        let order = [
            "dwEntityList",
            "dwLocalPlayerPawn",
            "dwViewMatrix",
            "m_hPlayerPawn",
            "m_iHealth",
            "m_lifeState",
            "m_iTeamNum",
            "m_vOldOrigin",
            "m_pGameSceneNode",
            "m_modelState",
            "m_boneArray",
            "m_nodeToWorld",
            "m_sSanitizedPlayerName",
        ];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::new().unwrap();
        let schema = OffsetSchema::from_documents(GLOBALS_JSON, CLASSES_JSON).unwrap();
        schema.save_to_path(temp_file.path()).unwrap();

        let loaded = OffsetSchema::load_from_path(temp_file.path()).unwrap();
        assert_eq!(loaded, schema);
    }

    #[test]
    fn test_load_rejects_zero_globals() {
        let temp_file = NamedTempFile::new().unwrap();
        OffsetSchema::default().save_to_path(temp_file.path()).unwrap();
        let err = OffsetSchema::load_from_path(temp_file.path()).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Invalid)));
    }

    #[test]
    fn test_load_or_resolve_skips_resolution_when_persisted() {
        let temp_file = NamedTempFile::new().unwrap();
        let schema = OffsetSchema::from_documents(GLOBALS_JSON, CLASSES_JSON).unwrap();
        schema.save_to_path(temp_file.path()).unwrap();

        let loaded = OffsetSchema::load_or_resolve::<_, _, SchemaError>(temp_file.path(), || {
            panic!("resolution must not run when a valid schema is persisted")
        })
        .unwrap();
        assert_eq!(loaded, schema);
    }

    #[test]
    fn test_load_or_resolve_persists_fresh_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCHEMA_FILE);

        let resolved = OffsetSchema::load_or_resolve(&path, || {
            OffsetSchema::from_documents(GLOBALS_JSON, CLASSES_JSON)
        })
        .unwrap();
        assert!(path.exists());
        assert_eq!(OffsetSchema::load_from_path(&path).unwrap(), resolved);
    }

    #[test]
    fn test_load_or_resolve_propagates_schema_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SCHEMA_FILE);

        let err = OffsetSchema::load_or_resolve(&path, || OffsetSchema::from_documents("{}", "{}"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::Unresolved(_)));
        assert!(!path.exists());
    }
}
