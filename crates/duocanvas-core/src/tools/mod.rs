//! Tool system for both environments.
//!
//! Tools are closed enums. Everything a caller needs to know about a tool
//! (display name, keyboard shortcut, whether it reverts after one use) lives
//! in a static [`ToolTraits`] table indexed by the enum discriminant, so a
//! tool is looked up once instead of being re-interpreted from strings.

use serde::{Deserialize, Serialize};

/// One of the two mutually exclusive editing environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Structured node/edge graph editor.
    #[default]
    Practical,
    /// Free-form drawing surface.
    Design,
}

impl Environment {
    pub fn other(self) -> Self {
        match self {
            Environment::Practical => Environment::Design,
            Environment::Design => Environment::Practical,
        }
    }
}

/// Static description of a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTraits {
    /// Stable identifier used by toolbars and scripts.
    pub name: &'static str,
    /// Single-key shortcut, lowercase.
    pub shortcut: Option<char>,
    /// Reverts to the selection tool after one use unless the
    /// keep-tool-active preference is set.
    pub one_shot: bool,
}

impl ToolTraits {
    const fn new(name: &'static str, shortcut: Option<char>, one_shot: bool) -> Self {
        Self {
            name,
            shortcut,
            one_shot,
        }
    }
}

/// Shared behavior of the per-environment tool enums.
pub trait ToolKind: Copy + Eq + 'static {
    /// Every tool, in discriminant order.
    const ALL: &'static [Self];

    fn traits(self) -> &'static ToolTraits;

    fn name(self) -> &'static str {
        self.traits().name
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tool| tool.name() == name)
    }

    fn from_shortcut(key: char) -> Option<Self> {
        let key = key.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|tool| tool.traits().shortcut == Some(key))
    }
}

/// Tools that work the same in both environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTool {
    /// Defer to the environment tool.
    #[default]
    Pointer,
    /// Drag to pan.
    Hand,
    /// Click to zoom.
    Zoom,
}

static NAVIGATION_TRAITS: [ToolTraits; 3] = [
    ToolTraits::new("pointer", None, false),
    ToolTraits::new("hand", Some('h'), false),
    ToolTraits::new("zoom", Some('z'), false),
];

impl ToolKind for NavigationTool {
    const ALL: &'static [Self] = &[NavigationTool::Pointer, NavigationTool::Hand, NavigationTool::Zoom];

    fn traits(self) -> &'static ToolTraits {
        &NAVIGATION_TRAITS[self as usize]
    }
}

/// Tools of the node/edge editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PracticalTool {
    #[default]
    Select,
    Node,
    Edge,
    Text,
    Eraser,
}

static PRACTICAL_TRAITS: [ToolTraits; 5] = [
    ToolTraits::new("select", Some('v'), false),
    ToolTraits::new("node", Some('n'), true),
    ToolTraits::new("edge", Some('e'), true),
    ToolTraits::new("text", Some('t'), true),
    ToolTraits::new("eraser", Some('x'), false),
];

impl ToolKind for PracticalTool {
    const ALL: &'static [Self] = &[
        PracticalTool::Select,
        PracticalTool::Node,
        PracticalTool::Edge,
        PracticalTool::Text,
        PracticalTool::Eraser,
    ];

    fn traits(self) -> &'static ToolTraits {
        &PRACTICAL_TRAITS[self as usize]
    }
}

/// Tools of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DesignTool {
    #[default]
    Select,
    Rectangle,
    Ellipse,
    Diamond,
    Line,
    Arrow,
    Freehand,
    Text,
    Eraser,
}

static DESIGN_TRAITS: [ToolTraits; 9] = [
    ToolTraits::new("select", Some('v'), false),
    ToolTraits::new("rectangle", Some('r'), true),
    ToolTraits::new("ellipse", Some('o'), true),
    ToolTraits::new("diamond", Some('d'), true),
    ToolTraits::new("line", Some('l'), true),
    ToolTraits::new("arrow", Some('a'), true),
    ToolTraits::new("freehand", Some('p'), false),
    ToolTraits::new("text", Some('t'), true),
    ToolTraits::new("eraser", Some('x'), false),
];

impl ToolKind for DesignTool {
    const ALL: &'static [Self] = &[
        DesignTool::Select,
        DesignTool::Rectangle,
        DesignTool::Ellipse,
        DesignTool::Diamond,
        DesignTool::Line,
        DesignTool::Arrow,
        DesignTool::Freehand,
        DesignTool::Text,
        DesignTool::Eraser,
    ];

    fn traits(self) -> &'static ToolTraits {
        &DESIGN_TRAITS[self as usize]
    }
}

/// The tool that currently receives pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "tool", rename_all = "snake_case")]
pub enum LiveTool {
    Navigation(NavigationTool),
    Practical(PracticalTool),
    Design(DesignTool),
}

impl LiveTool {
    /// Resolve which tool handles input.
    ///
    /// Passthrough forces the hand tool; a non-pointer navigation tool comes
    /// next; otherwise the tool of the active environment.
    pub fn resolve(
        environment: Environment,
        navigation: NavigationTool,
        practical: PracticalTool,
        design: DesignTool,
        passthrough: bool,
    ) -> Self {
        if passthrough {
            return LiveTool::Navigation(NavigationTool::Hand);
        }
        if navigation != NavigationTool::Pointer {
            return LiveTool::Navigation(navigation);
        }
        match environment {
            Environment::Practical => LiveTool::Practical(practical),
            Environment::Design => LiveTool::Design(design),
        }
    }

    /// Resolve a keyboard shortcut against the tools available in `environment`.
    ///
    /// Environment tools shadow navigation tools.
    pub fn from_shortcut(environment: Environment, key: char) -> Option<Self> {
        let scoped = match environment {
            Environment::Practical => PracticalTool::from_shortcut(key).map(LiveTool::Practical),
            Environment::Design => DesignTool::from_shortcut(key).map(LiveTool::Design),
        };
        scoped.or_else(|| NavigationTool::from_shortcut(key).map(LiveTool::Navigation))
    }

    pub fn traits(self) -> &'static ToolTraits {
        match self {
            LiveTool::Navigation(tool) => tool.traits(),
            LiveTool::Practical(tool) => tool.traits(),
            LiveTool::Design(tool) => tool.traits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_traits_table_matches_discriminants() {
        for &tool in DesignTool::ALL {
            assert_eq!(DesignTool::from_name(tool.name()), Some(tool));
        }
        for &tool in PracticalTool::ALL {
            assert_eq!(PracticalTool::from_name(tool.name()), Some(tool));
        }
        for &tool in NavigationTool::ALL {
            assert_eq!(NavigationTool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(DesignTool::Freehand.name(), "freehand");
        assert_eq!(PracticalTool::Eraser.name(), "eraser");
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(DesignTool::from_name("lasso"), None);
    }

    #[test]
    fn test_one_shot_flags() {
        assert!(DesignTool::Rectangle.traits().one_shot);
        assert!(PracticalTool::Node.traits().one_shot);
        assert!(!DesignTool::Freehand.traits().one_shot);
        assert!(!PracticalTool::Select.traits().one_shot);
    }

    #[test]
    fn test_shortcut_scoped_to_environment() {
        assert_eq!(
            LiveTool::from_shortcut(Environment::Design, 'R'),
            Some(LiveTool::Design(DesignTool::Rectangle))
        );
        assert_eq!(LiveTool::from_shortcut(Environment::Practical, 'r'), None);
        assert_eq!(
            LiveTool::from_shortcut(Environment::Practical, 'n'),
            Some(LiveTool::Practical(PracticalTool::Node))
        );
        assert_eq!(
            LiveTool::from_shortcut(Environment::Practical, 'h'),
            Some(LiveTool::Navigation(NavigationTool::Hand))
        );
    }

    #[test]
    fn test_live_tool_resolution() {
        let live = LiveTool::resolve(
            Environment::Design,
            NavigationTool::Pointer,
            PracticalTool::Edge,
            DesignTool::Arrow,
            false,
        );
        assert_eq!(live, LiveTool::Design(DesignTool::Arrow));

        let live = LiveTool::resolve(
            Environment::Practical,
            NavigationTool::Zoom,
            PracticalTool::Edge,
            DesignTool::Arrow,
            false,
        );
        assert_eq!(live, LiveTool::Navigation(NavigationTool::Zoom));

        let live = LiveTool::resolve(
            Environment::Practical,
            NavigationTool::Zoom,
            PracticalTool::Edge,
            DesignTool::Arrow,
            true,
        );
        assert_eq!(live, LiveTool::Navigation(NavigationTool::Hand));
    }

    #[test]
    fn test_environment_other() {
        assert_eq!(Environment::Practical.other(), Environment::Design);
        assert_eq!(Environment::Design.other(), Environment::Practical);
    }
}
