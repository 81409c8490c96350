//! SMuFL metadata path probing (spec.md §6): locates `<fontName>/<fontName>.json`
//! under the platform-specific search directories a music font's SMuFL
//! metadata is installed into.
//!
//! Grounded on spec.md §6's literal platform table; no teacher counterpart
//! exists (the teacher never classifies music fonts), so the probing order
//! is implemented directly from the spec text rather than adapted from an
//! example file.

use std::env;
use std::path::{Path, PathBuf};

use crate::document::LoadOptions;

/// The ordered list of directories to search for `<fontName>/<fontName>.json`,
/// honoring `LoadOptions::smufl_search_paths_override` when set (spec.md §6
/// "A test override path replaces this list entirely").
pub fn search_paths(options: &LoadOptions) -> Vec<PathBuf> {
    if let Some(paths) = &options.smufl_search_paths_override {
        return paths.clone();
    }
    platform_search_paths()
}

#[cfg(target_os = "windows")]
fn platform_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(local_app_data) = env::var("LOCALAPPDATA") {
        paths.push(Path::new(&local_app_data).join("SMuFL").join("Fonts"));
    }
    if let Ok(common_program_files) = env::var("COMMONPROGRAMFILES") {
        paths.push(Path::new(&common_program_files).join("SMuFL").join("Fonts"));
    }
    paths
}

#[cfg(target_os = "macos")]
fn platform_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(home) = env::var("HOME") {
        paths.push(Path::new(&home).join("Library").join("Application Support").join("SMuFL").join("Fonts"));
    }
    paths
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn platform_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    let xdg_data_home = env::var("XDG_DATA_HOME").ok().filter(|v| !v.is_empty()).map(PathBuf::from).or_else(|| {
        env::var("HOME").ok().map(|home| Path::new(&home).join(".local").join("share"))
    });
    if let Some(base) = xdg_data_home {
        paths.push(base.join("SMuFL").join("Fonts"));
    }

    let xdg_data_dirs = env::var("XDG_DATA_DIRS").ok().filter(|v| !v.is_empty()).unwrap_or_else(|| "/usr/local/share:/usr/share".to_string());
    for dir in xdg_data_dirs.split(':').filter(|d| !d.is_empty()) {
        paths.push(Path::new(dir).join("SMuFL").join("Fonts"));
    }

    paths
}

/// Finds `<fontName>/<fontName>.json` under `search_paths`, in order;
/// `None` if no such file exists on disk in any of them.
pub fn find_font_metadata(font_name: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    search_paths.iter().map(|dir| dir.join(font_name).join(format!("{font_name}.json"))).find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_the_platform_list_entirely() {
        let options = LoadOptions { smufl_search_paths_override: Some(vec![PathBuf::from("/tmp/fixture-smufl")]), ..Default::default() };
        assert_eq!(search_paths(&options), vec![PathBuf::from("/tmp/fixture-smufl")]);
    }

    #[test]
    fn find_font_metadata_returns_none_when_absent_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let paths = vec![dir.path().to_path_buf()];
        assert!(find_font_metadata("Finale Maestro", &paths).is_none());
    }

    #[test]
    fn find_font_metadata_locates_the_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let font_dir = dir.path().join("Finale Maestro");
        std::fs::create_dir_all(&font_dir).unwrap();
        std::fs::write(font_dir.join("Finale Maestro.json"), "{}").unwrap();

        let paths = vec![dir.path().to_path_buf()];
        let found = find_font_metadata("Finale Maestro", &paths).unwrap();
        assert_eq!(found, font_dir.join("Finale Maestro.json"));
    }
}
