//! Mission layering: a base mission refined by appended specifications

use serde::{Deserialize, Serialize};

/// Separator between the base mission and each specification layer
pub const LAYER_SEPARATOR: &str = " -> ";

/// Base mission plus zero or more specification layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSpec {
    pub base: String,
    #[serde(default)]
    pub layers: Vec<String>,
}

impl MissionSpec {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            layers: Vec::new(),
        }
    }

    pub fn push_layer(&mut self, layer: impl Into<String>) {
        self.layers.push(layer.into());
    }

    /// Swap the base mission, keeping or dropping the existing layers
    pub fn replace_base(&mut self, base: impl Into<String>, keep_layers: bool) {
        self.base = base.into();
        if !keep_layers {
            self.layers.clear();
        }
    }

    pub fn has_layers(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Collapse into the single string stored at seal time
    pub fn render(&self) -> String {
        std::iter::once(self.base.as_str())
            .chain(self.layers.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(LAYER_SEPARATOR)
    }
}

impl std::fmt::Display for MissionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_without_layers_is_base() {
        let mission = MissionSpec::new("Study");
        assert_eq!(mission.render(), "Study");
    }

    #[test]
    fn test_render_with_layers() {
        let mut mission = MissionSpec::new("Study");
        mission.push_layer("Chapter 3");
        mission.push_layer("Exercises");
        assert_eq!(mission.render(), "Study -> Chapter 3 -> Exercises");
        assert_eq!(mission.to_string(), mission.render());
    }

    #[test]
    fn test_replace_base_keep_layers() {
        let mut mission = MissionSpec::new("Study");
        mission.push_layer("Chapter 3");
        mission.replace_base("Review", true);
        assert_eq!(mission.render(), "Review -> Chapter 3");
    }

    #[test]
    fn test_replace_base_discard_layers() {
        let mut mission = MissionSpec::new("Study");
        mission.push_layer("Chapter 3");
        mission.replace_base("Review", false);
        assert_eq!(mission.render(), "Review");
        assert!(!mission.has_layers());
    }
}
