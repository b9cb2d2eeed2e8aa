use std::fmt::Write as FmtWrite;
use std::path::Path;

use anyhow::{Context, Result};

use super::HeatmapScene;
use crate::color::to_hex;
use crate::data::model::MONTH_NAMES;

const LEGEND_MARGIN: f64 = 20.0;
const LEGEND_AXIS_HEIGHT: f64 = 30.0;

const STYLE: &str = r#"<style>
body{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}
main{margin:0 auto;text-align:center;}
h1{margin:0 0 8px 0;font-size:28px;}
#description{color:#555;margin:0 0 12px 0;}
.tick text{font-size:10px;}
#tooltip{background:rgba(0,0,0,0.8);color:#fff;padding:6px 10px;border-radius:4px;font-size:12px;pointer-events:none;text-align:left;}
</style>
"#;

const SCRIPT: &str = r#"const tooltip = document.getElementById("tooltip");
document.querySelectorAll("rect.cell").forEach((cell) => {
  cell.addEventListener("mouseover", (event) => {
    const d = cell.dataset;
    tooltip.innerHTML = MONTHS[Number(d.month)] + " " + d.year + "<br>" +
      Number(d.temp).toFixed(2) + " °C<br>" + d.variance + " °C";
    tooltip.setAttribute("data-year", d.year);
    tooltip.style.left = event.pageX + 20 + "px";
    tooltip.style.top = event.pageY - 30 + "px";
    tooltip.style.visibility = "visible";
    cell.style.opacity = 0.8;
  });
  cell.addEventListener("mouseout", () => {
    tooltip.style.visibility = "hidden";
    cell.style.opacity = 1;
  });
});
"#;

/// Render the scene as a self-contained HTML page.
pub fn render_document(scene: &HeatmapScene) -> Result<String> {
    let cfg = &scene.config;
    let mut html = String::with_capacity(128 + scene.cells.len() * 200);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(html, "<title>{}</title>", escape(&scene.title))?;
    html.push_str(STYLE);
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<main style=\"width:{}px\">", cfg.width)?;
    writeln!(html, "<h1 id=\"title\">{}</h1>", escape(&scene.title))?;
    writeln!(html, "<p id=\"description\">{}</p>", escape(&scene.description))?;

    // ---- Chart ----
    writeln!(
        html,
        "<svg width=\"{}\" height=\"{}\" data-base-temperature=\"{}\">",
        cfg.width, cfg.height, scene.base_temperature
    )?;

    writeln!(
        html,
        "<g id=\"x-axis\" transform=\"translate(0,{})\">",
        cfg.plot_bottom()
    )?;
    writeln!(
        html,
        "<path class=\"domain\" stroke=\"#000\" d=\"M{},0H{}\"/>",
        cfg.padding,
        cfg.width - cfg.padding
    )?;
    for tick in &scene.x_ticks {
        writeln!(
            html,
            "<g class=\"tick\" transform=\"translate({:.2},0)\"><line stroke=\"#000\" y2=\"6\"/><text y=\"9\" dy=\"0.71em\" text-anchor=\"middle\">{}</text></g>",
            tick.position,
            escape(&tick.label)
        )?;
    }
    writeln!(html, "</g>")?;

    writeln!(
        html,
        "<g id=\"y-axis\" transform=\"translate({},0)\">",
        cfg.padding
    )?;
    writeln!(
        html,
        "<path class=\"domain\" stroke=\"#000\" d=\"M0,{}V{}\"/>",
        cfg.plot_top(),
        cfg.plot_bottom()
    )?;
    for tick in &scene.y_ticks {
        writeln!(
            html,
            "<g class=\"tick\" transform=\"translate(0,{:.2})\"><line stroke=\"#000\" x2=\"-6\"/><text x=\"-9\" dy=\"0.32em\" text-anchor=\"end\">{}</text></g>",
            tick.position,
            escape(&tick.label)
        )?;
    }
    writeln!(html, "</g>")?;

    writeln!(
        html,
        "<text text-anchor=\"end\" x=\"{}\" y=\"{}\">Year</text>",
        cfg.width / 2.0,
        cfg.height - cfg.padding / 2.0
    )?;
    writeln!(
        html,
        "<text text-anchor=\"end\" x=\"{:.2}\" y=\"{}\" transform=\"rotate(-90)\">Month</text>",
        -cfg.height / 3.0,
        cfg.padding / 2.0 - 10.0
    )?;

    for cell in &scene.cells {
        writeln!(
            html,
            "<rect class=\"cell\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" data-year=\"{}\" data-month=\"{}\" data-temp=\"{}\" data-variance=\"{}\"/>",
            cell.x,
            cell.y,
            cell.width,
            cell.height,
            to_hex(cell.fill),
            cell.year,
            cell.month_index(),
            cell.temperature,
            cell.variance
        )?;
    }
    writeln!(html, "</svg>")?;

    writeln!(
        html,
        "<div id=\"tooltip\" style=\"visibility:hidden;position:absolute\"></div>"
    )?;

    // ---- Legend ----
    let legend = &scene.legend;
    let size = legend.swatch_size();
    writeln!(html, "<p>Temperature Range(°C)</p>")?;
    writeln!(
        html,
        "<svg id=\"legend\" width=\"{}\" height=\"{:.2}\">",
        legend.width + 2.0 * LEGEND_MARGIN,
        size + LEGEND_AXIS_HEIGHT
    )?;
    writeln!(html, "<g transform=\"translate({LEGEND_MARGIN},0)\">")?;
    for swatch in &legend.swatches {
        writeln!(
            html,
            "<rect x=\"{:.2}\" y=\"0\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
            swatch.x,
            swatch.size,
            swatch.size,
            to_hex(swatch.fill)
        )?;
    }
    writeln!(
        html,
        "<g id=\"axisLegend\" transform=\"translate(0,{size:.2})\">"
    )?;
    for tick in &legend.ticks {
        writeln!(
            html,
            "<g class=\"tick\" transform=\"translate({:.2},0)\"><line stroke=\"#000\" y2=\"6\"/><text y=\"9\" dy=\"0.71em\" text-anchor=\"middle\">{}</text></g>",
            tick.position,
            escape(&tick.label)
        )?;
    }
    writeln!(html, "</g>")?;
    writeln!(html, "</g>")?;
    writeln!(html, "</svg>")?;
    writeln!(html, "</main>")?;

    // ---- Hover behaviour ----
    let months = MONTH_NAMES
        .iter()
        .map(|m| format!("\"{m}\""))
        .collect::<Vec<_>>()
        .join(",");
    writeln!(html, "<script>")?;
    writeln!(html, "const MONTHS = [{months}];")?;
    html.push_str(SCRIPT);
    writeln!(html, "</script>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    Ok(html)
}

pub fn write_document(scene: &HeatmapScene, path: &Path) -> Result<()> {
    let html = render_document(scene).context("rendering HTML")?;
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Palette;
    use crate::render::ChartConfig;
    use crate::render::tests::three_observations;

    fn document() -> String {
        let scene = HeatmapScene::build(
            &three_observations(),
            &Palette::default(),
            &ChartConfig::default(),
        )
        .unwrap();
        render_document(&scene).unwrap()
    }

    #[test]
    fn one_rect_per_observation() {
        let html = document();
        assert_eq!(html.matches("class=\"cell\"").count(), 3);
        for temp in ["6", "8", "11"] {
            assert!(html.contains(&format!("data-temp=\"{temp}\"")), "missing {temp}");
        }
        assert!(html.contains("data-year=\"1901\" data-month=\"0\""));
        assert!(html.contains("data-year=\"1900\" data-month=\"1\""));
    }

    #[test]
    fn page_structure() {
        let html = document();
        assert!(html.contains("<h1 id=\"title\">Monthly Global Land-Surface Temperature</h1>"));
        assert!(html.contains("<p id=\"description\">"));
        assert!(html.contains("<svg width=\"1200\" height=\"500\""));
        assert!(html.contains("<g id=\"x-axis\" transform=\"translate(0,425)\">"));
        assert!(html.contains("<g id=\"y-axis\" transform=\"translate(75,0)\">"));
        assert!(html.contains(">Year</text>"));
        assert!(html.contains(">Month</text>"));
        assert!(html.contains(">January</text>"));
        assert!(html.contains(">December</text>"));
        assert!(html.contains("id=\"tooltip\" style=\"visibility:hidden"));
    }

    #[test]
    fn legend_has_swatches_and_boundary_labels() {
        let html = document();
        let legend = &html[html.find("<svg id=\"legend\"").unwrap()..];
        assert_eq!(legend.matches("<rect ").count(), 9);
        assert!(legend.contains("<g id=\"axisLegend\""));
        assert!(legend.contains(">6.0</text>"));
        assert_eq!(legend.matches("class=\"tick\"").count(), 9);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }
}
