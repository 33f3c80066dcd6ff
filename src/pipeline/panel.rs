use rayon::prelude::*;

use crate::{
    detect::{
        classify::classify_regions,
        extract::extract_regions,
        preprocess::binarize,
        select::{select_region_excluding, sort_reading_order},
    },
    foundation::{
        core::{PixelRect, Raster},
        error::{LettererError, LettererResult},
    },
    model::{region::Region, request::ElementRequest},
    pipeline::config::LettererConfig,
    render::{panel::composite_element, strip},
    text::{
        fit::{FitResult, fit_element, interior_rect},
        typeset::{Typesetter, TypesetterSource},
    },
};

#[derive(Clone, Debug, Default)]
pub struct PanelThreading {
    pub parallel: bool,
    /// Worker count for the dedicated pool. `None` lets rayon decide.
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, PartialEq)]
/// Lettered panel for a single request.
pub struct PanelResult {
    pub image: Raster,
    /// Region the text went into (a synthesized one in degraded mode).
    pub region: Region,
    pub interior: PixelRect,
    pub fit: FitResult,
    pub degraded: bool,
}

#[derive(Clone, Debug, PartialEq)]
/// Placement record for one request of a multi-element panel.
pub struct ElementOutcome {
    pub request: ElementRequest,
    pub region: Region,
    pub interior: PixelRect,
    pub fit: FitResult,
    pub degraded: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PanelRender {
    pub image: Raster,
    /// One entry per request, in request order.
    pub outcomes: Vec<ElementOutcome>,
}

#[derive(Clone, Debug)]
pub struct PanelJob {
    pub image: Raster,
    pub requests: Vec<ElementRequest>,
}

/// Detection, fitting and compositing for comic panels.
///
/// Holds only read-only state: the calibration config and a typesetter source (typically a
/// shared [`FontAsset`](crate::FontAsset)). Every call builds its regions and layouts fresh.
pub struct Letterer<S: TypesetterSource> {
    config: LettererConfig,
    source: S,
}

impl<S: TypesetterSource> Letterer<S> {
    pub fn new(config: LettererConfig, source: S) -> LettererResult<Self> {
        config.validate()?;
        Ok(Self { config, source })
    }

    pub fn config(&self) -> &LettererConfig {
        &self.config
    }

    /// Classified candidate regions of `image`, in reading order.
    pub fn detect(&self, image: &Raster) -> Vec<Region> {
        let mask = binarize(image, &self.config.preprocess);
        let mut regions = extract_regions(&mask, &self.config.extract);
        classify_regions(&mut regions, image.bounds(), &self.config.classifier);
        sort_reading_order(&mut regions, image.height(), self.config.selector.row_ratio);
        regions
    }

    /// Letter one element onto a copy of `image`.
    #[tracing::instrument(
        skip(self, image, request),
        fields(
            kind = request.kind.as_str(),
            anchor = request.anchor.as_str(),
            width = image.width(),
            height = image.height()
        )
    )]
    pub fn detect_and_render(
        &self,
        image: &Raster,
        request: &ElementRequest,
    ) -> LettererResult<PanelResult> {
        let mut typesetter = self.source.typesetter()?;
        let regions = self.detect(image);
        let (image, outcome, _) = self.letter(&mut typesetter, image, &regions, &[], request)?;
        Ok(PanelResult {
            image,
            region: outcome.region,
            interior: outcome.interior,
            fit: outcome.fit,
            degraded: outcome.degraded,
        })
    }

    /// Letter several elements onto one panel in order.
    ///
    /// Regions are detected once on the input image; each request picks among the
    /// candidates earlier requests left unused.
    pub fn render_elements(
        &self,
        image: &Raster,
        requests: &[ElementRequest],
    ) -> LettererResult<PanelRender> {
        let mut typesetter = self.source.typesetter()?;
        self.render_elements_with(&mut typesetter, image, requests)
    }

    /// Render independent panels, optionally on a dedicated rayon pool.
    ///
    /// Output order equals input order and matches the sequential result exactly.
    pub fn render_panels(
        &self,
        jobs: &[PanelJob],
        threading: &PanelThreading,
    ) -> LettererResult<Vec<PanelRender>> {
        if !threading.parallel || jobs.len() <= 1 {
            let mut typesetter = self.source.typesetter()?;
            return jobs
                .iter()
                .map(|job| self.render_elements_with(&mut typesetter, &job.image, &job.requests))
                .collect();
        }

        let pool = build_thread_pool(threading.threads)?;
        let rendered = pool.install(|| {
            jobs.par_iter()
                .map_init(
                    || None,
                    |slot: &mut Option<S::Setter>, job| -> LettererResult<PanelRender> {
                        // One typesetter per worker, built on its first job.
                        let typesetter = match slot.take() {
                            Some(t) => t,
                            None => self.source.typesetter()?,
                        };
                        let typesetter = slot.insert(typesetter);
                        self.render_elements_with(typesetter, &job.image, &job.requests)
                    },
                )
                .collect::<Vec<_>>()
        });
        rendered.into_iter().collect()
    }

    /// Join finished panels into one strip using the configured gutter, margin and background.
    pub fn assemble_strip(&self, panels: &[Raster], columns: u32) -> LettererResult<Raster> {
        strip::assemble_strip(panels, columns, &self.config.strip)
    }

    fn render_elements_with(
        &self,
        typesetter: &mut S::Setter,
        image: &Raster,
        requests: &[ElementRequest],
    ) -> LettererResult<PanelRender> {
        let regions = self.detect(image);
        let mut used = Vec::new();
        let mut current = image.clone();
        let mut outcomes = Vec::with_capacity(requests.len());

        for request in requests {
            let (next, outcome, index) =
                self.letter(typesetter, &current, &regions, &used, request)?;
            used.extend(index);
            current = next;
            outcomes.push(outcome);
        }

        Ok(PanelRender {
            image: current,
            outcomes,
        })
    }

    fn letter<T: Typesetter + ?Sized>(
        &self,
        typesetter: &mut T,
        image: &Raster,
        regions: &[Region],
        used: &[usize],
        request: &ElementRequest,
    ) -> LettererResult<(Raster, ElementOutcome, Option<usize>)> {
        request.validate()?;
        let cfg = &self.config;

        let selection =
            select_region_excluding(regions, image.bounds(), request, used, &cfg.selector);
        if selection.degraded {
            tracing::warn!(
                kind = request.kind.as_str(),
                anchor = request.anchor.as_str(),
                candidates = regions.len(),
                "no matching region; using fallback placement"
            );
        }

        let interior = interior_rect(&selection.region, &cfg.fit);
        let fit = fit_element(typesetter, request, interior.width, interior.height, &cfg.fit)?;
        if fit.truncated {
            tracing::debug!(font_size = fit.font_size, "element text truncated");
        }

        let lettered = composite_element(
            typesetter,
            image,
            request.kind,
            selection.region.bbox,
            interior,
            &fit,
            selection.degraded,
            &cfg.style,
        )?;

        Ok((
            lettered,
            ElementOutcome {
                request: request.clone(),
                region: selection.region,
                interior,
                fit,
                degraded: selection.degraded,
            },
            selection.index,
        ))
    }
}

fn build_thread_pool(threads: Option<usize>) -> LettererResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LettererError::config(
            "panel threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LettererError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/panel.rs"]
mod tests;
