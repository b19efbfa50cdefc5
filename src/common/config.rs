use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

fn yes() -> bool { true }

fn default_root_edge_size() -> f64 { 50.0 }
fn default_between_drop_size() -> f64 { 8.0 }
fn default_body_center_fraction() -> f64 { 0.5 }
fn default_drop_split_ratio() -> f64 { 0.3 }
fn default_header_placeholder_size() -> f64 { 6.0 }

fn default_header_height() -> f64 { 20.0 }
fn default_drag_proxy_width() -> f64 { 300.0 }
fn default_drag_proxy_height() -> f64 { 200.0 }
fn default_min_item_width() -> f64 { 10.0 }
fn default_min_item_height() -> f64 { 10.0 }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Ignore pointer moves outside the container while dragging.
    #[serde(default = "yes")]
    pub constrain_drag_to_container: bool,
    #[serde(default)]
    pub drop: DropSettings,
    #[serde(default)]
    pub dimensions: Dimensions,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            constrain_drag_to_container: true,
            drop: DropSettings::default(),
            dimensions: Dimensions::default(),
        }
    }
}

/// Sizes of the drop zones built while dragging.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct DropSettings {
    /// Thickness in px of the strips along the container edges.
    #[serde(default = "default_root_edge_size")]
    pub root_edge_size: f64,
    /// Thickness in px of the strips between row and column children.
    #[serde(default = "default_between_drop_size")]
    pub between_drop_size: f64,
    /// Fraction of a stack body, centered, that adds the item as a tab.
    /// The rest of the body splits the stack.
    #[serde(default = "default_body_center_fraction")]
    pub body_center_fraction: f64,
    /// Share of the target's space the dropped item gets on a split.
    #[serde(default = "default_drop_split_ratio")]
    pub drop_split_ratio: f64,
    #[serde(default = "default_header_placeholder_size")]
    pub header_placeholder_size: f64,
}

impl Default for DropSettings {
    fn default() -> Self {
        DropSettings {
            root_edge_size: default_root_edge_size(),
            between_drop_size: default_between_drop_size(),
            body_center_fraction: default_body_center_fraction(),
            drop_split_ratio: default_drop_split_ratio(),
            header_placeholder_size: default_header_placeholder_size(),
        }
    }
}

impl DropSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.root_edge_size < 0.0 {
            issues.push("drop.root_edge_size must be non-negative".to_string());
        }
        if self.between_drop_size < 0.0 {
            issues.push("drop.between_drop_size must be non-negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.body_center_fraction) {
            issues.push(format!(
                "drop.body_center_fraction ({}) must be between 0 and 1",
                self.body_center_fraction
            ));
        }
        if !(self.drop_split_ratio > 0.0 && self.drop_split_ratio < 1.0) {
            issues.push(format!(
                "drop.drop_split_ratio ({}) must be strictly between 0 and 1",
                self.drop_split_ratio
            ));
        }
        if self.header_placeholder_size < 0.0 {
            issues.push("drop.header_placeholder_size must be non-negative".to_string());
        }
        issues
    }
}

/// Fixed pixel dimensions used by the layout.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Dimensions {
    #[serde(default = "default_header_height")]
    pub header_height: f64,
    #[serde(default = "default_drag_proxy_width")]
    pub drag_proxy_width: f64,
    #[serde(default = "default_drag_proxy_height")]
    pub drag_proxy_height: f64,
    /// Used for items that set no minimum of their own.
    #[serde(default = "default_min_item_width")]
    pub min_item_width: f64,
    #[serde(default = "default_min_item_height")]
    pub min_item_height: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Dimensions {
            header_height: default_header_height(),
            drag_proxy_width: default_drag_proxy_width(),
            drag_proxy_height: default_drag_proxy_height(),
            min_item_width: default_min_item_width(),
            min_item_height: default_min_item_height(),
        }
    }
}

impl Dimensions {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let fields = [
            ("header_height", self.header_height),
            ("drag_proxy_width", self.drag_proxy_width),
            ("drag_proxy_height", self.drag_proxy_height),
            ("min_item_width", self.min_item_width),
            ("min_item_height", self.min_item_height),
        ];
        for (name, value) in fields {
            if value < 0.0 || !value.is_finite() {
                issues.push(format!("dimensions.{name} must be a non-negative number"));
            }
        }
        if self.header_height >= self.drag_proxy_height
            || self.header_height >= self.drag_proxy_width
        {
            issues.push("dimensions.header_height must be smaller than the drag proxy".to_string());
        }
        issues
    }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = self.drop.validate();
        issues.extend(self.dimensions.validate());
        issues
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("loading config file {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        let config: Config = match toml::from_str(buf) {
            Ok(c) => c,
            Err(e) => {
                let msg = e.to_string();
                match Self::suggest_field(&msg) {
                    Some(suggestion) => bail!("{msg}\nDid you mean `{suggestion}`?"),
                    None => bail!("{msg}"),
                }
            }
        };
        let issues = config.validate();
        if !issues.is_empty() {
            bail!("invalid config:\n  {}", issues.join("\n  "));
        }
        Ok(config)
    }

    /// For serde's "unknown field `x`, expected one of `a`, `b`" errors,
    /// returns the expected field closest to the unknown one.
    fn suggest_field(err: &str) -> Option<String> {
        let needle = "unknown field `";
        let rest = &err[err.find(needle)? + needle.len()..];
        let end = rest.find('`')?;
        let unknown = rest[..end].to_lowercase();
        let candidates = rest[end + 1..].split('`').skip(1).step_by(2);
        candidates
            .map(|cand| (Self::levenshtein(&unknown, &cand.to_lowercase()), cand))
            .filter(|&(dist, _)| dist <= 3)
            .min_by_key(|&(dist, _)| dist)
            .map(|(_, cand)| cand.to_string())
    }

    fn levenshtein(a: &str, b: &str) -> usize {
        let b: Vec<char> = b.chars().collect();
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        for (i, ca) in a.chars().enumerate() {
            let mut row = vec![i + 1; b.len() + 1];
            for (j, &cb) in b.iter().enumerate() {
                let cost = usize::from(ca != cb);
                row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
            }
            prev = row;
        }
        prev[b.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validate_default_is_valid() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn test_parse_empty_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.settings.constrain_drag_to_container);
        assert_eq!(cfg.settings.drop.root_edge_size, 50.0);
        assert_eq!(cfg.settings.dimensions.header_height, 20.0);
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml = r#"
            [settings]
            constrain_drag_to_container = false

            [settings.drop]
            drop_split_ratio = 0.25
        "#;
        let cfg = Config::parse(toml).unwrap();
        assert!(!cfg.settings.constrain_drag_to_container);
        assert_eq!(cfg.settings.drop.drop_split_ratio, 0.25);
        assert_eq!(cfg.settings.drop.body_center_fraction, 0.5);
    }

    #[test]
    fn test_parse_suggests_misspelled_fields() {
        let toml = r#"
            [settings.drop]
            root_edge_sise = 40
        "#;
        let err = Config::parse(toml).unwrap_err().to_string();
        assert!(err.contains("Did you mean `root_edge_size`?"), "{err}");
    }

    #[test]
    fn test_parse_rejects_invalid_values() {
        let toml = r#"
            [settings.drop]
            drop_split_ratio = 1.5
        "#;
        let err = Config::parse(toml).unwrap_err().to_string();
        assert!(err.contains("drop_split_ratio"), "{err}");
    }

    #[test]
    fn test_drop_settings_validation_center_fraction() {
        let mut drop = DropSettings::default();
        drop.body_center_fraction = -0.1;
        let issues = drop.validate();
        assert!(issues.iter().any(|i| i.contains("body_center_fraction")));
    }

    #[test]
    fn test_dimensions_validation_negative_values() {
        let mut dims = Dimensions::default();
        dims.min_item_width = -1.0;
        dims.header_height = f64::NAN;
        let issues = dims.validate();
        assert!(issues.iter().any(|i| i.contains("min_item_width")));
        assert!(issues.iter().any(|i| i.contains("header_height")));
    }

    #[test]
    fn test_read_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("dockyard.toml");
        let mut cfg = Config::default();
        cfg.settings.drop.root_edge_size = 32.0;
        cfg.save(&path).unwrap();
        assert_eq!(Config::read(&path).unwrap(), cfg);
    }

    #[test]
    fn test_read_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::read(&dir.path().join("absent.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("absent.toml"));
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(Config::levenshtein("kitten", "sitting"), 3);
        assert_eq!(Config::levenshtein("", "abc"), 3);
        assert_eq!(Config::levenshtein("same", "same"), 0);
    }
}
