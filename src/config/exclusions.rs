use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectType {
    /// CMake-based Qt project (CMakeLists.txt)
    CMake,
    /// qmake project (*.pro)
    QMake,
    Node,
    Rust,
    Generic,
}

pub fn detect_project_type(base_dir: &Path) -> ProjectType {
    if base_dir.join("CMakeLists.txt").exists() {
        ProjectType::CMake
    } else if has_pro_file(base_dir) {
        ProjectType::QMake
    } else if base_dir.join("package.json").exists() {
        ProjectType::Node
    } else if base_dir.join("Cargo.toml").exists() {
        ProjectType::Rust
    } else {
        ProjectType::Generic
    }
}

fn has_pro_file(base_dir: &Path) -> bool {
    std::fs::read_dir(base_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .any(|e| e.path().extension().is_some_and(|ext| ext == "pro"))
        })
        .unwrap_or(false)
}

/// Directory names skipped while scanning for translation files
pub fn get_default_exclusions(project_type: ProjectType) -> Vec<&'static str> {
    let mut exclusions = vec![".git", ".svn", ".hg", ".idea", ".vscode", ".DS_Store"];

    match project_type {
        ProjectType::CMake => {
            // vendored submodules ship their own catalogues
            exclusions.extend_from_slice(&["build", "out", "externals", "_deps"]);
        }
        ProjectType::QMake => {
            exclusions.extend_from_slice(&["build", "debug", "release"]);
        }
        ProjectType::Node => {
            exclusions.extend_from_slice(&["node_modules", "dist", "build", "coverage"]);
        }
        ProjectType::Rust => {
            exclusions.extend_from_slice(&["target"]);
        }
        ProjectType::Generic => {
            exclusions.extend_from_slice(&["node_modules", "vendor", "build", "target"]);
        }
    }

    exclusions
}
