use anyhow::{bail, Result};
use serde::Serialize;

use whirl_core::layout::{compute_layout, LayoutParams};
use whirl_core::{circular, AppConfig, ItemPlacement, Size};

#[derive(Serialize)]
struct LayoutReport {
    count: usize,
    position: f64,
    viewport: Size,
    current_index: usize,
    placements: Vec<ItemPlacement>,
}

pub fn run(
    config: &AppConfig,
    count: usize,
    position: f64,
    width: f64,
    height: f64,
    json: bool,
) -> Result<()> {
    if !position.is_finite() {
        bail!("position must be a finite number");
    }
    let viewport = Size::new(width, height);
    if viewport.is_empty() {
        bail!("viewport must have a positive width and height");
    }

    let position = circular::wrap(position);
    let params = LayoutParams {
        clamp_appearance: config.carousel.clamp_appearance,
        ..LayoutParams::default()
    };
    let report = LayoutReport {
        count,
        position,
        viewport,
        current_index: circular::nearest_index(position, count),
        placements: compute_layout(count, position, viewport, true, &params),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.placements.is_empty() {
        println!("No items.");
        return Ok(());
    }

    println!(
        "position {:.4}, viewport {}x{}, front item {}",
        report.position, width, height, report.current_index
    );
    println!(
        "{:>5}  {:>8}  {:>8}  {:>7}  {:>7}  {:>17}  {:>4}",
        "index", "angle", "dist", "scale", "alpha", "origin", "vis"
    );
    for placement in &report.placements {
        let marker = if placement.is_central { "*" } else { " " };
        println!(
            "{:>4}{}  {:>8.4}  {:>8.4}  {:>7.3}  {:>7.3}  {:>8.1},{:>8.1}  {:>4}",
            placement.index,
            marker,
            placement.angle,
            placement.distance,
            placement.scale,
            placement.alpha,
            placement.frame.origin.x,
            placement.frame.origin.y,
            if placement.is_visible { "yes" } else { "no" },
        );
    }

    Ok(())
}
