//! Offsets command: resolve the schema from its source documents and persist it.

use std::path::Path;

use anyhow::{Context, Result};
use sightline_core::OffsetSchema;

use crate::schema_source::SchemaSource;

pub fn run(source: &SchemaSource, output: &Path) -> Result<()> {
    let schema = source.resolve()?;
    schema
        .save_to_path(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    print_schema(&schema);
    println!();
    println!("Saved to {}", output.display());
    Ok(())
}

fn print_schema(schema: &OffsetSchema) {
    println!("dwEntityList:           0x{:X}", schema.entity_list);
    println!("dwLocalPlayerPawn:      0x{:X}", schema.local_player_pawn);
    println!("dwViewMatrix:           0x{:X}", schema.view_matrix);
    println!("m_hPlayerPawn:          0x{:X}", schema.player_pawn_handle);
    println!("m_iHealth:              0x{:X}", schema.health);
    println!("m_lifeState:            0x{:X}", schema.life_state);
    println!("m_iTeamNum:             0x{:X}", schema.team);
    println!("m_vOldOrigin:           0x{:X}", schema.origin);
    println!("m_pGameSceneNode:       0x{:X}", schema.scene_node);
    println!("m_modelState:           0x{:X}", schema.model_state);
    println!("m_boneArray:            0x{:X}", schema.bone_array);
    println!("m_nodeToWorld:          0x{:X}", schema.node_to_world);
    println!("m_sSanitizedPlayerName: 0x{:X}", schema.player_name);
}
