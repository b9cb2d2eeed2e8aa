use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use palette::Srgb;

use super::HeatmapScene;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const LEGEND_GAP: u32 = 20;

/// Rasterise cells, axis lines and legend swatches. Labels are not drawn.
pub fn render_image(scene: &HeatmapScene) -> RgbImage {
    let cfg = &scene.config;
    let legend = &scene.legend;
    let width = cfg.width.ceil() as u32;
    let chart_height = cfg.height.ceil() as u32;
    let height = chart_height + LEGEND_GAP + legend.swatch_size().ceil() as u32 + LEGEND_GAP;

    let mut img = RgbImage::from_pixel(width, height, BACKGROUND);

    for cell in &scene.cells {
        fill_rect(&mut img, cell.x, cell.y, cell.width, cell.height, pixel(cell.fill));
    }

    // Axis lines
    fill_rect(
        &mut img,
        cfg.padding,
        cfg.plot_bottom(),
        cfg.width - 2.0 * cfg.padding,
        1.0,
        AXIS,
    );
    fill_rect(
        &mut img,
        cfg.padding - 1.0,
        cfg.plot_top(),
        1.0,
        cfg.plot_bottom() - cfg.plot_top(),
        AXIS,
    );

    let legend_top = f64::from(chart_height + LEGEND_GAP);
    for swatch in &legend.swatches {
        fill_rect(
            &mut img,
            cfg.padding + swatch.x,
            legend_top,
            swatch.size,
            swatch.size,
            pixel(swatch.fill),
        );
    }

    img
}

pub fn write_png(scene: &HeatmapScene, path: &Path) -> Result<()> {
    render_image(scene)
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn pixel(color: Srgb<u8>) -> Rgb<u8> {
    Rgb([color.red, color.green, color.blue])
}

/// Fill the pixels whose top-left corner lies in the rectangle, clipped to the image.
fn fill_rect(img: &mut RgbImage, x: f64, y: f64, w: f64, h: f64, color: Rgb<u8>) {
    let x0 = x.round().max(0.0) as u32;
    let y0 = y.round().max(0.0) as u32;
    let x1 = ((x + w).round().max(0.0) as u32).min(img.width());
    let y1 = ((y + h).round().max(0.0) as u32).min(img.height());
    for py in y0..y1 {
        for px in x0..x1 {
            img.put_pixel(px, py, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;
    use crate::render::ChartConfig;
    use crate::render::tests::three_observations;

    fn scene() -> HeatmapScene {
        HeatmapScene::build(
            &three_observations(),
            &Palette::default(),
            &ChartConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn cells_are_painted_with_their_fill() {
        let scene = scene();
        let img = render_image(&scene);
        assert_eq!(img.width(), 1200);
        for cell in &scene.cells {
            let cx = (cell.x + cell.width / 2.0) as u32;
            let cy = (cell.y + cell.height / 2.0) as u32;
            assert_eq!(*img.get_pixel(cx, cy), pixel(cell.fill));
        }
        // Feb 1901 is missing from the data.
        let (x, y) = (900, (scene.config.plot_top() + scene.config.row_height() * 1.5) as u32);
        assert_eq!(*img.get_pixel(x, y), BACKGROUND);
    }

    #[test]
    fn legend_swatches_below_chart() {
        let scene = scene();
        let img = render_image(&scene);
        let first = &scene.legend.swatches[0];
        let y = 500 + LEGEND_GAP + 5;
        assert_eq!(*img.get_pixel(80, y), pixel(first.fill));
    }

    #[test]
    fn writes_png_file() {
        let path = std::env::temp_dir().join(format!("heatmap-panda-{}.png", std::process::id()));
        write_png(&scene(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }
}
