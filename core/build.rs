use std::collections::HashSet;
use std::env;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Deserialize)]
struct CatalogFile {
    beads: Vec<BeadEntry>,
}

#[derive(Deserialize)]
struct BeadEntry {
    id: String,
    name: String,
    price_cents: u64,
    diameter_mm: f32,
    color: String,
    #[serde(default = "default_in_stock")]
    in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

fn main() {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("missing CARGO_MANIFEST_DIR"));
    let workspace_root = manifest_dir.parent().unwrap_or(&manifest_dir);
    let env_path = workspace_root.join(".env");
    let env_local_path = workspace_root.join(".env.local");

    let _ = dotenvy::from_filename(&env_local_path);
    let _ = dotenvy::from_filename(&env_path);

    println!("cargo:rerun-if-env-changed=BEAD_CATALOG_PATH");
    println!("cargo:rerun-if-changed={}", env_path.display());
    println!("cargo:rerun-if-changed={}", env_local_path.display());

    let catalog_path = resolve_catalog_path(workspace_root);
    println!("cargo:rerun-if-changed={}", catalog_path.display());

    let contents = fs::read_to_string(&catalog_path).unwrap_or_else(|err| {
        panic!(
            "failed to read bead catalog at {}: {err}",
            catalog_path.display()
        )
    });

    let catalog: CatalogFile = toml::from_str(&contents).unwrap_or_else(|err| {
        panic!(
            "failed to parse bead catalog at {}: {err}",
            catalog_path.display()
        )
    });

    if catalog.beads.is_empty() {
        panic!("bead catalog {} has no entries", catalog_path.display());
    }

    validate_entries(&catalog.beads, &catalog_path);

    let mut output = String::new();
    writeln!(&mut output, "pub const BEAD_CATALOG: &[BeadCatalogEntry] = &[").unwrap();
    for entry in &catalog.beads {
        writeln!(&mut output, "    BeadCatalogEntry {{").unwrap();
        writeln!(&mut output, "        id: {},", rust_string(&entry.id)).unwrap();
        writeln!(&mut output, "        name: {},", rust_string(&entry.name)).unwrap();
        writeln!(&mut output, "        price_cents: {},", entry.price_cents).unwrap();
        writeln!(&mut output, "        diameter_mm: {:?},", entry.diameter_mm).unwrap();
        writeln!(&mut output, "        color: {},", rust_string(&entry.color)).unwrap();
        writeln!(&mut output, "        in_stock: {},", entry.in_stock).unwrap();
        writeln!(&mut output, "    }},").unwrap();
    }
    writeln!(&mut output, "];").unwrap();

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("missing OUT_DIR"));
    let out_path = out_dir.join("bead_catalog.rs");
    fs::write(&out_path, output).unwrap_or_else(|err| {
        panic!("failed to write {}: {err}", out_path.display())
    });
}

fn resolve_catalog_path(workspace_root: &Path) -> PathBuf {
    let env_value = env::var("BEAD_CATALOG_PATH").ok();
    let raw_path = match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => workspace_root.join("catalog/beads.toml"),
    };
    if raw_path.is_relative() {
        workspace_root.join(raw_path)
    } else {
        raw_path
    }
}

fn rust_string(value: &str) -> String {
    format!("{:?}", value)
}

fn validate_entries(entries: &[BeadEntry], catalog_path: &Path) {
    let mut ids = HashSet::new();

    for entry in entries {
        if entry.id.trim().is_empty() {
            panic!("bead id cannot be empty in {}", catalog_path.display());
        }
        if entry.name.trim().is_empty() {
            panic!(
                "bead '{}' has an empty name in {}",
                entry.id,
                catalog_path.display()
            );
        }
        if entry.color.trim().is_empty() {
            panic!(
                "bead '{}' has an empty color in {}",
                entry.id,
                catalog_path.display()
            );
        }
        if !entry.diameter_mm.is_finite() || entry.diameter_mm <= 0.0 {
            panic!(
                "bead '{}' has invalid diameter {} in {}",
                entry.id,
                entry.diameter_mm,
                catalog_path.display()
            );
        }
        if !ids.insert(entry.id.clone()) {
            panic!(
                "duplicate bead id '{}' in {}",
                entry.id,
                catalog_path.display()
            );
        }
    }
}
