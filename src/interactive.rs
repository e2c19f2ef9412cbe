//! # Interactive Flow Module
//!
//! Walks the user through file selection and compression settings when the
//! binary is launched with no arguments. Every recoverable input error
//! (missing path, bad destination, oversized target) re-prompts instead of
//! aborting.

use crate::classifier::{Classifier, FileDescriptor};
use crate::settings::{
    validate_target_size, AdvancedSettings, CompressionSettings, QualityTier,
};
use crate::summary::format_size;
use anyhow::Result;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

/// Collect files and settings interactively.
///
/// Returns the finalized selection, or an error when the user aborts at
/// the final confirmation.
pub async fn collect() -> Result<(Vec<FileDescriptor>, CompressionSettings)> {
    let theme = ColorfulTheme::default();

    let descriptors = prompt_files(&theme).await?;

    let total: u64 = descriptors.iter().map(|d| d.size).sum();
    println!(
        "Selected {} file(s), {} total",
        descriptors.len(),
        format_size(total)
    );

    let tiers = ["high", "medium", "low", "custom"];
    let selection = Select::with_theme(&theme)
        .with_prompt("Quality")
        .items(&tiers)
        .default(1)
        .interact()?;
    let tier: QualityTier = tiers[selection]
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let custom_quality = if tier == QualityTier::Custom {
        let quality: u8 = Input::with_theme(&theme)
            .with_prompt("Quality percent (1-100)")
            .validate_with(|q: &u8| {
                if (1..=100).contains(q) {
                    Ok(())
                } else {
                    Err("must be between 1 and 100")
                }
            })
            .interact_text()?;
        Some(quality)
    } else {
        None
    };

    let advanced = if Confirm::with_theme(&theme)
        .with_prompt("Configure advanced settings?")
        .default(false)
        .interact()?
    {
        Some(prompt_advanced(&theme, &descriptors)?)
    } else {
        None
    };

    let remove_input_file = Confirm::with_theme(&theme)
        .with_prompt("Delete originals after a successful compression?")
        .default(false)
        .interact()?;

    if !Confirm::with_theme(&theme)
        .with_prompt("Start compression?")
        .default(true)
        .interact()?
    {
        anyhow::bail!("aborted by user");
    }

    let settings = CompressionSettings::resolve(tier, custom_quality, remove_input_file, advanced);
    Ok((descriptors, settings))
}

async fn prompt_files(theme: &ColorfulTheme) -> Result<Vec<FileDescriptor>> {
    loop {
        let input: String = Input::with_theme(theme)
            .with_prompt("File or folder to compress")
            .interact_text()?;
        let path = PathBuf::from(input.trim());

        if path.is_dir() {
            let found = Classifier::enumerate(&path).await?;
            if found.is_empty() {
                println!(
                    "{} no supported media files in {}",
                    style("!").yellow(),
                    path.display()
                );
                continue;
            }
            return Ok(found);
        }

        match Classifier::classify(&path).await? {
            Some(descriptor) => return Ok(vec![descriptor]),
            None => {
                println!(
                    "{} {} is not a supported media file",
                    style("!").yellow(),
                    path.display()
                );
            }
        }
    }
}

fn prompt_advanced(
    theme: &ColorfulTheme,
    descriptors: &[FileDescriptor],
) -> Result<AdvancedSettings> {
    let output_folder = loop {
        let input: String = Input::with_theme(theme)
            .with_prompt("Output folder (empty = same as input)")
            .allow_empty(true)
            .interact_text()?;
        let input = input.trim();
        if input.is_empty() {
            break None;
        }
        let folder = PathBuf::from(input);
        if folder.is_dir() {
            break Some(folder);
        }
        println!(
            "{} {} does not exist or is not a directory",
            style("!").yellow(),
            folder.display()
        );
    };

    // Target must be strictly smaller than every input; checked here, at
    // input time, never at encode time
    let target_size = loop {
        let input: String = Input::with_theme(theme)
            .with_prompt("Target size in bytes (empty = use quality tier)")
            .allow_empty(true)
            .interact_text()?;
        let input = input.trim();
        if input.is_empty() {
            break None;
        }
        match input.parse::<u64>() {
            Ok(target) => match validate_target_size(target, descriptors) {
                Ok(()) => break Some(target),
                Err(e) => println!("{} {}", style("!").yellow(), e),
            },
            Err(_) => println!("{} not a byte count", style("!").yellow()),
        }
    };

    let format: String = Input::with_theme(theme)
        .with_prompt("Output format (empty = keep original)")
        .allow_empty(true)
        .interact_text()?;
    let output_format = {
        let format = format.trim().trim_start_matches('.').to_lowercase();
        (!format.is_empty()).then_some(format)
    };

    Ok(AdvancedSettings {
        output_folder,
        target_size,
        output_format,
    })
}
