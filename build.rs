use std::{fs, path::Path};

fn main() {
    // Askama reads templates at compile time; make cargo notice edits to them.
    rerun_if_changed_dir(Path::new("templates"));
    println!("cargo:rerun-if-changed=build.rs");
}

fn rerun_if_changed_dir(dir: &Path) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            rerun_if_changed_dir(&path);
        } else if path.extension().and_then(|ext| ext.to_str()) == Some("html") {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }
}
