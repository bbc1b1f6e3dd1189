use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::bake::renderer::{RenderJob, TemplateRenderer};
use crate::catalog::brand::BrandConfig;
use crate::catalog::template::{TemplateCatalog, TemplateDefinition};
use crate::foundation::core::Canvas;
use crate::foundation::error::{EditorError, EditorResult};
use crate::render::backend::FrameRGBA;
use crate::scene::object::ObjectId;
use crate::session::editor::{EditorSession, NoticeLevel};

const DEFAULT_BAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bake timing policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BakeOpts {
    /// Upper bound for the whole render; `BRANDCANVAS_BAKE_TIMEOUT_MS` overrides the default.
    pub timeout: Duration,
    /// Passed to the renderer as [`RenderJob::settle_delay`], waited before rasterizing.
    pub settle_delay: Duration,
}

impl Default for BakeOpts {
    fn default() -> Self {
        let timeout = std::env::var("BRANDCANVAS_BAKE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map_or(DEFAULT_BAKE_TIMEOUT, Duration::from_millis);
        Self {
            timeout,
            settle_delay: Duration::ZERO,
        }
    }
}

impl BakeOpts {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

/// What to bake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BakeRequest {
    pub template_id: String,
    /// Brand override; the session brand is used when `None`.
    pub brand: Option<BrandConfig>,
    pub variables: BTreeMap<String, String>,
}

impl BakeRequest {
    pub fn new(template_id: impl Into<String>) -> Self {
        Self {
            template_id: template_id.into(),
            brand: None,
            variables: BTreeMap::new(),
        }
    }

    pub fn with_brand(mut self, brand: BrandConfig) -> Self {
        self.brand = Some(brand);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// Handle for one issued bake. Only the most recently issued ticket may install.
#[derive(Clone, Debug)]
pub struct BakeTicket {
    generation: u64,
    template_id: String,
    canvas: Canvas,
    cancel: CancellationToken,
}

impl BakeTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    /// Native size the background will be installed at.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// True once a newer bake superseded this one.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BakeOutcome {
    /// The background was installed and the canvas resized.
    Installed { canvas: Canvas, background: ObjectId },
    /// A newer bake was issued first; nothing was changed.
    Superseded,
}

/// Renders templates and installs them as the session's background layer.
///
/// A new bake supersedes the one in flight: the older ticket is cancelled and its result, should
/// it still arrive, is discarded. The scene is only touched once a capture succeeds.
pub struct BakePipeline<R> {
    renderer: R,
    catalog: TemplateCatalog,
    opts: BakeOpts,
}

impl<R: TemplateRenderer> BakePipeline<R> {
    pub fn new(renderer: R, catalog: TemplateCatalog, opts: BakeOpts) -> Self {
        Self {
            renderer,
            catalog,
            opts,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn opts(&self) -> &BakeOpts {
        &self.opts
    }

    /// Build the render job for `request` against the session's brand.
    pub fn prepare_job(
        &self,
        session: &EditorSession,
        request: &BakeRequest,
    ) -> EditorResult<RenderJob> {
        let template = self.catalog.get(&request.template_id)?;
        let variables = template.resolve_variables(&request.variables)?;
        let brand = request
            .brand
            .clone()
            .unwrap_or_else(|| session.brand().clone());
        Ok(RenderJob {
            canvas: template.canvas(),
            template: template.clone(),
            brand,
            variables,
            settle_delay: self.opts.settle_delay,
        })
    }

    /// Cancel whichever bake is in flight and invalidate its ticket.
    pub fn supersede(&self, session: &mut EditorSession) {
        let slot = &mut session.bake;
        if let Some(prev) = slot.cancel.take() {
            prev.cancel();
        }
        slot.generation += 1;
    }

    /// Issue a ticket for `template`, cancelling whichever bake was in flight.
    pub fn begin_bake(&self, session: &mut EditorSession, template: &TemplateDefinition) -> BakeTicket {
        self.supersede(session);
        let slot = &mut session.bake;
        let cancel = CancellationToken::new();
        slot.cancel = Some(cancel.clone());

        tracing::debug!(generation = slot.generation, template = %template.id, "bake issued");
        BakeTicket {
            generation: slot.generation,
            template_id: template.id.clone(),
            canvas: template.canvas(),
            cancel,
        }
    }

    /// Install a captured frame if `ticket` is still the latest bake.
    pub fn install_bake(
        &self,
        session: &mut EditorSession,
        ticket: &BakeTicket,
        frame: FrameRGBA,
    ) -> EditorResult<BakeOutcome> {
        if !is_current(session, ticket) {
            tracing::debug!(generation = ticket.generation, "stale bake result dropped");
            return Ok(BakeOutcome::Superseded);
        }

        let image = frame.into_prepared_image()?;
        let background = session
            .scene_mut()
            .install_background(ticket.canvas, ticket.template_id.clone(), image);
        session.set_template_id(Some(ticket.template_id.clone()));
        session.bake.cancel = None;

        Ok(BakeOutcome::Installed {
            canvas: ticket.canvas,
            background,
        })
    }

    /// Render and install a template.
    ///
    /// The session is only borrowed between suspension points, so other operations may run while
    /// the render is pending. Failures leave the scene unchanged, add a notice, and are returned.
    #[tracing::instrument(skip(self, session, request), fields(template = %request.template_id))]
    pub async fn bake(
        &self,
        session: &RefCell<EditorSession>,
        request: BakeRequest,
    ) -> EditorResult<BakeOutcome> {
        let (ticket, job) = {
            let mut s = session.borrow_mut();
            let job = match self.prepare_job(&s, &request) {
                Ok(job) => job,
                Err(e) => {
                    self.supersede(&mut s);
                    s.notify(NoticeLevel::Error, user_message(&e));
                    return Err(e);
                }
            };
            let ticket = self.begin_bake(&mut s, &job.template);
            (ticket, job)
        };

        let captured = tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => {
                tracing::debug!(generation = ticket.generation, "bake superseded while rendering");
                return Ok(BakeOutcome::Superseded);
            }
            r = tokio::time::timeout(self.opts.timeout, self.renderer.render(&job)) => {
                r.unwrap_or_else(|_| Err(EditorError::Timeout(self.opts.timeout)))
            }
        };

        let mut s = session.borrow_mut();
        match captured {
            Ok(frame) => match self.install_bake(&mut s, &ticket, frame) {
                Err(e) => Err(self.fail(&mut s, &ticket, e)),
                ok => ok,
            },
            Err(_) if !is_current(&s, &ticket) => Ok(BakeOutcome::Superseded),
            Err(e) => Err(self.fail(&mut s, &ticket, e)),
        }
    }

    fn fail(&self, session: &mut EditorSession, ticket: &BakeTicket, e: EditorError) -> EditorError {
        tracing::warn!(generation = ticket.generation, error = %e, "bake failed");
        if is_current(session, ticket) {
            session.bake.cancel = None;
        }
        session.notify(NoticeLevel::Error, user_message(&e));
        e
    }
}

fn is_current(session: &EditorSession, ticket: &BakeTicket) -> bool {
    session.bake.generation == ticket.generation && !ticket.cancel.is_cancelled()
}

fn user_message(e: &EditorError) -> String {
    match e {
        EditorError::TemplateNotFound(_) => "Template not found".to_string(),
        EditorError::Timeout(d) => format!("Template took longer than {}ms to render", d.as_millis()),
        other => format!("Template could not be rendered: {other}"),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/pipeline.rs"]
mod tests;
