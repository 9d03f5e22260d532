//! Interactive configuration wizard for creating `resume.toml`.
//!
//! The wizard asks for the document's name and title, its theme, the markdown
//! extensions to enable and the PDF settings, then writes the file to the
//! current directory.

use crate::config::{Configuration, DocumentConfig, MarkdownConfig, PdfConfig, CONFIG_FILE};
use crate::markup::extensions::BUILTIN;
use crate::pdf::{Length, MarginSpec};
use crate::theme::{get_theme, list_theme_ids};
use anyhow::{Context, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, FuzzySelect, Input};
use std::path::PathBuf;

/// Run the interactive configuration wizard.
pub fn run() -> Result<()> {
    let theme = ColorfulTheme {
        ..ColorfulTheme::default()
    };

    let name: String = Input::with_theme(&theme)
        .with_prompt("Document name (used for the PDF file name)")
        .default("resume".to_string())
        .interact()
        .with_context(|| "Failed to obtain document name")?;

    let title: String = Input::with_theme(&theme)
        .with_prompt("Web page title (leave blank to use the document name)")
        .allow_empty(true)
        .interact()
        .with_context(|| "Failed to obtain title")?;

    let theme_ids = list_theme_ids();
    let theme_items: Vec<String> = theme_ids
        .iter()
        .map(|id| {
            let config = get_theme(id);
            format!("{id} ({}): {}", config.name, config.description)
        })
        .collect();
    let theme_idx = FuzzySelect::with_theme(&theme)
        .with_prompt("Colour theme")
        .items(&theme_items)
        .default(0)
        .interact()?;

    let mut extensions = Vec::new();
    for extension in BUILTIN {
        if Confirm::with_theme(&theme)
            .with_prompt(format!("Enable the `{extension}` markdown extension?"))
            .default(false)
            .interact()?
        {
            extensions.push(extension.to_string());
        }
    }
    let footnotes = Confirm::with_theme(&theme)
        .with_prompt("Enable `[^label]` footnotes?")
        .default(false)
        .interact()?;

    let margin: String = Input::with_theme(&theme)
        .with_prompt("PDF page margin, e.g. 0, 48px or 12mm (leave blank for browser defaults)")
        .allow_empty(true)
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                return Ok(());
            }
            Length::Css(input.trim().to_string())
                .to_inches()
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact()?;
    let margin = match margin.trim() {
        "" => None,
        raw => Some(MarginSpec::Uniform(Length::Css(raw.to_string()))),
    };

    let executable = if Confirm::with_theme(&theme)
        .with_prompt("Do you want to specify the Chrome/Chromium executable?")
        .default(false)
        .interact()?
    {
        let path: String = Input::with_theme(&theme)
            .with_prompt("Path to the browser executable")
            .interact()?;
        Some(PathBuf::from(path))
    } else {
        None
    };

    let config = Configuration {
        document: DocumentConfig {
            name,
            title,
            theme: theme_ids[theme_idx].to_string(),
            ..DocumentConfig::default()
        },
        markdown: MarkdownConfig {
            extensions,
            footnotes,
        },
        pdf: PdfConfig {
            margin,
            executable,
            ..PdfConfig::default()
        },
    };

    let config =
        toml::to_string_pretty(&config).with_context(|| "Failed to convert configuration to TOML")?;

    let config_path = PathBuf::from(CONFIG_FILE);
    if config_path.exists()
        && !Confirm::with_theme(&theme)
            .with_prompt(format!("{CONFIG_FILE} already exists, do you want to override it?"))
            .interact()?
    {
        println!("Configuration:");
        println!("{}", config);
    } else {
        std::fs::write(&config_path, config)
            .with_context(|| "Failed to write configuration file")?;
        println!("{CONFIG_FILE} written!");
    }

    Ok(())
}
