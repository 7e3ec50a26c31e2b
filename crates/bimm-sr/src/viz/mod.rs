//! # Side-by-Side Super-Resolution Plots

/// Colormaps.
pub mod colormap;

use crate::viz::colormap::jet_range;
use anyhow::{Context, anyhow, bail};
use burn::config::Config;
use burn::prelude::{Backend, Tensor};
use image::imageops::FilterType;
use image::{Rgb, RgbImage, imageops};
use plotters::prelude::{BLACK, BitMapBackend, IntoDrawingArea, IntoFont, TextStyle};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};

/// Plot styling.
#[derive(Config, Debug)]
pub struct SrPlotConfig {
    /// Value mapped to the bottom of the colormap.
    #[config(default = 37.042)]
    pub vmin: f64,

    /// Value mapped to the top of the colormap.
    #[config(default = 83.1)]
    pub vmax: f64,

    /// The channel plotted.
    #[config(default = 0)]
    pub channel: usize,

    /// Panel height in pixels.
    #[config(default = 256)]
    pub panel_size: u32,

    /// White gap between panels, in pixels.
    #[config(default = 16)]
    pub gap: u32,

    /// Height of the title band above the panels; `0` disables titles.
    #[config(default = 32)]
    pub title_height: u32,

    /// Title font size, in pixels.
    #[config(default = 20.0)]
    pub title_size: f64,

    /// Title of the LR panel.
    #[config(default = "String::from(\"LR u Input\")")]
    pub lr_title: String,

    /// Title of the SR panel.
    #[config(default = "String::from(\"MR u Output\")")]
    pub sr_title: String,
}

/// Draw centered `(title, x)` labels into the title band of `canvas`.
fn draw_titles(
    canvas: &mut RgbImage,
    titles: [(&str, u32); 2],
    config: &SrPlotConfig,
) -> anyhow::Result<()> {
    let (width, height) = canvas.dimensions();
    let root = BitMapBackend::with_buffer(canvas, (width, height)).into_drawing_area();
    let style = TextStyle::from(("sans-serif", config.title_size).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let y = (config.title_height / 2) as i32;
    for (title, x) in titles {
        root.draw_text(title, &style, (x as i32, y))
            .map_err(|e| anyhow!("drawing title {title:?}: {e}"))?;
    }
    root.present()
        .map_err(|e| anyhow!("rendering titles: {e}"))?;
    Ok(())
}

/// One ``(N, C, H, W)`` batch, flattened to host values.
struct HostBatch {
    dims: [usize; 4],
    values: Vec<f64>,
}

impl HostBatch {
    fn new<B: Backend>(x: Tensor<B, 4>) -> anyhow::Result<Self> {
        let dims = x.dims();
        let values = x
            .into_data()
            .convert::<f64>()
            .to_vec::<f64>()
            .map_err(|e| anyhow!("reading tensor data: {e:?}"))?;
        Ok(Self { dims, values })
    }

    /// Render channel `channel` of sample `i`, row 0 at the bottom.
    fn panel(
        &self,
        i: usize,
        channel: usize,
        config: &SrPlotConfig,
    ) -> RgbImage {
        let [_, c, h, w] = self.dims;
        let base = (i * c + channel) * h * w;
        let raw = RgbImage::from_fn(w as u32, h as u32, |x, y| {
            let row = h - 1 - y as usize;
            jet_range(
                self.values[base + row * w + x as usize],
                config.vmin,
                config.vmax,
            )
        });

        let height = config.panel_size.max(1);
        let width = ((w as f64 * height as f64 / h as f64).round() as u32).max(1);
        imageops::resize(&raw, width, height, FilterType::Nearest)
    }
}

/// Plot each LR / SR pair as a PNG.
///
/// ## Arguments
///
/// * `indices` - Sample indices; names the files `img{index:05}.png`.
/// * `lr` - Low resolution inputs, ``(N, C, h, w)``.
/// * `sr` - Super-resolved outputs, ``(N, C, H, W)``.
/// * `out_dir` - Output directory; created if missing.
/// * `config` - Plot styling.
///
/// ## Returns
///
/// The written file paths, in sample order.
pub fn plot_sr_data<B: Backend, P: AsRef<Path>>(
    indices: &[usize],
    lr: Tensor<B, 4>,
    sr: Tensor<B, 4>,
    out_dir: P,
    config: &SrPlotConfig,
) -> anyhow::Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    let lr = HostBatch::new(lr)?;
    let sr = HostBatch::new(sr)?;

    let n = lr.dims[0];
    if sr.dims[0] != n {
        bail!("LR batch {:?} and SR batch {:?} differ in size", lr.dims, sr.dims);
    }
    if indices.len() != n {
        bail!("{} indices for a batch of {n}", indices.len());
    }
    for (name, batch) in [("LR", &lr), ("SR", &sr)] {
        if config.channel >= batch.dims[1] {
            bail!(
                "channel {} out of range for {name} batch {:?}",
                config.channel,
                batch.dims
            );
        }
        if batch.dims[2] == 0 || batch.dims[3] == 0 {
            bail!("empty {name} images: {:?}", batch.dims);
        }
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating plot directory {}", out_dir.display()))?;

    let mut paths = Vec::with_capacity(n);
    for (i, &index) in indices.iter().enumerate() {
        let left = lr.panel(i, config.channel, config);
        let right = sr.panel(i, config.channel, config);

        let band = config.title_height;
        let right_x = left.width() + config.gap;
        let mut canvas = RgbImage::from_pixel(
            right_x + right.width(),
            band + config.panel_size.max(1),
            Rgb([255, 255, 255]),
        );
        imageops::replace(&mut canvas, &left, 0, band as i64);
        imageops::replace(&mut canvas, &right, right_x as i64, band as i64);

        let path = out_dir.join(format!("img{index:05}.png"));
        if band > 0 {
            let titles = [
                (config.lr_title.as_str(), left.width() / 2),
                (config.sr_title.as_str(), right_x + right.width() / 2),
            ];
            if let Err(e) = draw_titles(&mut canvas, titles, config) {
                log::warn!("Saving {} untitled: {e:#}", path.display());
            }
        }
        canvas
            .save(&path)
            .with_context(|| format!("saving plot {}", path.display()))?;
        log::debug!("Saved {}", path.display());
        paths.push(path);
    }

    log::info!("Plotted {n} samples to {}", out_dir.display());
    Ok(paths)
}
