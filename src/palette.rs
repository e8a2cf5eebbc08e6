//! Built-in color palettes for community coloring.

use crate::error::{ExplorerError, Result};

/// Name of the palette used when nothing else is chosen.
pub const DEFAULT_PALETTE: &str = "Default (bold)";

/// A named, ordered list of CSS colors, indexed cyclically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
	/// Registry name.
	pub name: &'static str,
	/// Colors in order.
	pub colors: &'static [&'static str],
}

impl Palette {
	/// Color for a community id, wrapping around the palette.
	pub fn color_for(&self, community: usize) -> &'static str {
		self.colors[community % self.colors.len()]
	}
}

static PALETTES: &[Palette] = &[
	Palette {
		name: DEFAULT_PALETTE,
		colors: &[
			"#e6194b", "#3cb44b", "#ffe119", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6",
			"#bcf60c", "#fabebe", "#008080", "#e6beff", "#9a6324", "#fffac8", "#800000", "#aaffc3",
			"#808000", "#ffd8b1", "#000075", "#808080",
		],
	},
	Palette {
		name: "Pastel",
		colors: &[
			"#ffd1dc", "#b5ead7", "#ffdac1", "#c7ceea", "#ffb7b2", "#b2f7ef", "#c9c9ff", "#f1cbff",
			"#f3ffe3", "#ffcbf6", "#f0e68c", "#b3cde0", "#decbe4", "#b4e7d9", "#fdfd96",
		],
	},
	Palette {
		name: "Vivid",
		colors: &[
			"#ff6f69", "#ffcc5c", "#88d8b0", "#96ceb4", "#ffeead", "#ff6f69", "#588c7e", "#f2e394",
			"#f2ae72", "#d96459", "#8c4646", "#f9d423", "#fc913a", "#ff4e50", "#1e90ff",
		],
	},
];

/// Look up a palette by name.
pub fn palette(name: &str) -> Result<&'static Palette> {
	PALETTES
		.iter()
		.find(|p| p.name == name)
		.ok_or_else(|| ExplorerError::UnknownPalette(name.to_string()))
}

/// Registered palette names, default first.
pub fn palette_names() -> impl Iterator<Item = &'static str> {
	PALETTES.iter().map(|p| p.name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lookup_and_cycle() {
		let bold = palette(DEFAULT_PALETTE).unwrap();
		assert_eq!(bold.colors.len(), 20);
		assert_eq!(bold.color_for(0), "#e6194b");
		assert_eq!(bold.color_for(21), "#3cb44b");
		assert_eq!(palette("Pastel").unwrap().colors.len(), 15);
	}

	#[test]
	fn unknown_palette() {
		assert!(matches!(palette("Neon"), Err(ExplorerError::UnknownPalette(n)) if n == "Neon"));
	}

	#[test]
	fn default_listed_first() {
		assert_eq!(palette_names().next(), Some(DEFAULT_PALETTE));
		assert_eq!(palette_names().count(), 3);
	}
}
