use std::path::Path;

use anyhow::anyhow;
use config::{Config, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Show "Preview Docs" lenses at all
    pub enable_code_lens: bool,
    /// Editor command the lenses invoke
    pub show_docs_command: String,
    pub inner_functions_require_public: bool,
}

impl Settings {
    pub fn new(root_dir: &Path) -> anyhow::Result<Settings> {
        let expanded = shellexpand::tilde("~/.config/doclens/settings");
        let settings = Config::builder()
            .add_source(File::with_name(&expanded).required(false))
            .add_source(
                File::with_name(&format!(
                    "{}/.doclens",
                    root_dir
                        .to_str()
                        .ok_or(anyhow!("Can't convert root_dir to str"))?
                ))
                .required(false),
            )
            .set_default("enable_code_lens", true)?
            .set_default("show_docs_command", "ballerina.showDocs")?
            .set_default("inner_functions_require_public", false)?
            .build()
            .map_err(|err| anyhow!("Build err: {err}"))?;

        let settings = settings.try_deserialize::<Settings>()?;

        anyhow::Ok(settings)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enable_code_lens: true,
            show_docs_command: "ballerina.showDocs".to_string(),
            inner_functions_require_public: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::test_utils::create_test_project_dir;

    #[test]
    fn test_project_file_overrides_defaults() {
        let (_temp_dir, project_dir) = create_test_project_dir();
        fs::write(
            project_dir.join(".doclens.toml"),
            "enable_code_lens = false\ninner_functions_require_public = true\n",
        )
        .unwrap();

        let settings = Settings::new(&project_dir).unwrap();

        assert!(!settings.enable_code_lens);
        assert!(settings.inner_functions_require_public);
        assert_eq!(settings.show_docs_command, "ballerina.showDocs");
    }

    #[test]
    fn test_show_docs_command_override() {
        let (_temp_dir, project_dir) = create_test_project_dir();
        fs::write(
            project_dir.join(".doclens.toml"),
            "show_docs_command = \"docs.preview\"\n",
        )
        .unwrap();

        let settings = Settings::new(&project_dir).unwrap();

        assert_eq!(settings.show_docs_command, "docs.preview");
        assert!(settings.enable_code_lens);
    }
}
