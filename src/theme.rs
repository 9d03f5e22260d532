//! Colour themes for the rendered résumé.
//!
//! Each theme is a fixed palette of eight semantic colour roles. The palette is
//! exposed to the page stylesheet as a block of `--theme-*` custom properties
//! injected into the document head, so the stylesheet itself never changes
//! between themes. Colour values reference the Tailwind v4 colour variables.

use std::fmt;
use std::str::FromStr;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug)]
pub enum Theme {
    #[default]
    Ocean,
    Forest,
    Violet,
    Sunset,
    Rose,
    Midnight,
    Sky,
    Amber,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::all()
            .iter()
            .copied()
            .find(|theme| theme.id() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown theme `{s}`"))
    }
}

impl Theme {
    pub fn id(&self) -> &'static str {
        match self {
            Theme::Ocean => "ocean",
            Theme::Forest => "forest",
            Theme::Violet => "violet",
            Theme::Sunset => "sunset",
            Theme::Rose => "rose",
            Theme::Midnight => "midnight",
            Theme::Sky => "sky",
            Theme::Amber => "amber",
        }
    }

    pub fn all() -> &'static [Theme] {
        &[
            Theme::Ocean,
            Theme::Forest,
            Theme::Violet,
            Theme::Sunset,
            Theme::Rose,
            Theme::Midnight,
            Theme::Sky,
            Theme::Amber,
        ]
    }

    pub fn config(&self) -> &'static ThemeConfig {
        match self {
            Theme::Ocean => &OCEAN,
            Theme::Forest => &FOREST,
            Theme::Violet => &VIOLET,
            Theme::Sunset => &SUNSET,
            Theme::Rose => &ROSE,
            Theme::Midnight => &MIDNIGHT,
            Theme::Sky => &SKY,
            Theme::Amber => &AMBER,
        }
    }
}

/// The eight semantic colour roles of a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    /// Headings, links
    pub primary: &'static str,
    /// Decorative lines
    pub accent: &'static str,
    /// Body text
    pub text: &'static str,
    /// Descriptions, lists
    pub text_muted: &'static str,
    pub border: &'static str,
    /// List markers
    pub marker: &'static str,
    pub bg_page: &'static str,
    pub bg_content: &'static str,
}

impl ThemeColors {
    /// The colour roles paired with their custom property suffix, in the order
    /// they are emitted by [`generate_theme_css`].
    pub fn roles(&self) -> [(&'static str, &'static str); 8] {
        [
            ("primary", self.primary),
            ("accent", self.accent),
            ("text", self.text),
            ("text-muted", self.text_muted),
            ("border", self.border),
            ("marker", self.marker),
            ("bg-page", self.bg_page),
            ("bg-content", self.bg_content),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    pub theme: Theme,
    pub name: &'static str,
    pub description: &'static str,
    pub colors: ThemeColors,
}

const OCEAN: ThemeConfig = ThemeConfig {
    theme: Theme::Ocean,
    name: "Ocean Blue",
    description: "Classic deep blue, professional and stable",
    colors: ThemeColors {
        primary: "var(--color-cyan-800)",
        accent: "color-mix(in oklch, var(--color-red-500) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-gray-200)",
        marker: "var(--color-gray-400)",
        bg_page: "var(--color-gray-100)",
        bg_content: "var(--color-white)",
    },
};

const FOREST: ThemeConfig = ThemeConfig {
    theme: Theme::Forest,
    name: "Forest Green",
    description: "Natural and fresh green tones",
    colors: ThemeColors {
        primary: "var(--color-emerald-700)",
        accent: "color-mix(in oklch, var(--color-emerald-500) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-emerald-100)",
        marker: "var(--color-emerald-400)",
        bg_page: "var(--color-emerald-50)",
        bg_content: "var(--color-white)",
    },
};

const VIOLET: ThemeConfig = ThemeConfig {
    theme: Theme::Violet,
    name: "Elegant Violet",
    description: "Sophisticated and mysterious purple tones",
    colors: ThemeColors {
        primary: "var(--color-violet-700)",
        accent: "color-mix(in oklch, var(--color-violet-400) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-violet-100)",
        marker: "var(--color-violet-400)",
        bg_page: "var(--color-violet-50)",
        bg_content: "var(--color-white)",
    },
};

const SUNSET: ThemeConfig = ThemeConfig {
    theme: Theme::Sunset,
    name: "Sunset Orange",
    description: "Warm and vibrant orange tones",
    colors: ThemeColors {
        primary: "var(--color-orange-600)",
        accent: "color-mix(in oklch, var(--color-orange-400) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-orange-100)",
        marker: "var(--color-orange-400)",
        bg_page: "var(--color-orange-50)",
        bg_content: "var(--color-white)",
    },
};

const ROSE: ThemeConfig = ThemeConfig {
    theme: Theme::Rose,
    name: "Rose Red",
    description: "Elegant and soft rose tones",
    colors: ThemeColors {
        primary: "var(--color-rose-600)",
        accent: "color-mix(in oklch, var(--color-rose-400) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-rose-100)",
        marker: "var(--color-rose-400)",
        bg_page: "var(--color-rose-50)",
        bg_content: "var(--color-white)",
    },
};

const MIDNIGHT: ThemeConfig = ThemeConfig {
    theme: Theme::Midnight,
    name: "Midnight Black",
    description: "Calm and restrained dark tones",
    colors: ThemeColors {
        primary: "var(--color-slate-800)",
        accent: "color-mix(in oklch, var(--color-slate-500) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-gray-300)",
        marker: "var(--color-gray-500)",
        bg_page: "var(--color-gray-100)",
        bg_content: "var(--color-white)",
    },
};

const SKY: ThemeConfig = ThemeConfig {
    theme: Theme::Sky,
    name: "Sky Blue",
    description: "Bright and refreshing light blue tones",
    colors: ThemeColors {
        primary: "var(--color-sky-600)",
        accent: "color-mix(in oklch, var(--color-sky-400) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-sky-100)",
        marker: "var(--color-sky-400)",
        bg_page: "var(--color-sky-50)",
        bg_content: "var(--color-white)",
    },
};

const AMBER: ThemeConfig = ThemeConfig {
    theme: Theme::Amber,
    name: "Amber Gold",
    description: "Elegant and luxurious golden tones",
    colors: ThemeColors {
        primary: "var(--color-amber-600)",
        accent: "color-mix(in oklch, var(--color-amber-400) 30%, transparent)",
        text: "var(--color-gray-700)",
        text_muted: "var(--color-gray-500)",
        border: "var(--color-amber-100)",
        marker: "var(--color-amber-400)",
        bg_page: "var(--color-amber-50)",
        bg_content: "var(--color-white)",
    },
};

/// Look up a theme by identifier.
///
/// Unknown identifiers fall back to the default theme; this lookup never fails.
pub fn get_theme(id: &str) -> &'static ThemeConfig {
    match id.parse::<Theme>() {
        Ok(theme) => theme.config(),
        Err(_) => {
            log::warn!(
                "Unknown theme `{id}`, falling back to `{}`",
                Theme::default()
            );
            Theme::default().config()
        }
    }
}

/// Generate the `:root` block of theme custom properties.
pub fn generate_theme_css(config: &ThemeConfig) -> String {
    let mut css = String::from(":root {\n");
    for (role, value) in config.colors.roles() {
        css.push_str(&format!("  --theme-{role}: {value};\n"));
    }
    css.push('}');
    css
}

/// All theme identifiers, in declaration order.
pub fn list_theme_ids() -> Vec<&'static str> {
    Theme::all().iter().map(Theme::id).collect()
}
