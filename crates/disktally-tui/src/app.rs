/// The run loop.
///
/// [`App::run`] repeats one iteration per pass: make sure the terminal is
/// up (except while scanning, which may run without one), then either
/// step the scan, step a deletion, or wait for a key. Every screen change
/// goes through [`Action`]s returned by the per-screen key handlers.
use crate::console::Console;
use crate::screens::{self, progress, shell};
use crate::state::{Action, Context, DeletePhase, Flow, Screen, Viewport};
use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use disktally_core::config::{Config, UiLevel};
use disktally_core::delete::{self, DeleteStep};
use disktally_core::model::format_size;
use disktally_core::pipeline::Pipeline;
use disktally_core::platform::is_terminal_stream_failure;
use disktally_core::redraw::{Clock, SystemClock, WaitMode};
use disktally_core::scan::SourceStep;
use std::io;

/// Width assumed for the status line when the terminal size is unknown.
const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    /// 1 when a fatal scan error ended the run, otherwise 0.
    pub exit_code: i32,
}

pub struct App<C: Console> {
    console: C,
    ctx: Context,
    screen: Screen,
    clock: Box<dyn Clock>,
}

impl<C: Console> App<C> {
    pub fn new(console: C, config: Config, pipeline: Pipeline) -> Self {
        Self {
            console,
            ctx: Context::new(config, pipeline),
            screen: Screen::Scanning,
            clock: Box::new(SystemClock),
        }
    }

    /// Replace the wall clock driving the redraw cadence.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    /// Run until the user quits, the export finishes, or a fatal error is
    /// acknowledged. The terminal is restored before returning.
    pub fn run(&mut self) -> Result<RunOutcome> {
        tracing::info!(
            "Run loop starting (ui: {:?}, refresh: {} ms)",
            self.ctx.config.ui,
            self.ctx.config.update_delay_ms
        );
        if self.ctx.config.ui == UiLevel::Full {
            self.ensure_terminal()?;
        }

        loop {
            let flow = if matches!(self.screen, Screen::Scanning) {
                self.scan_step()?
            } else if matches!(
                self.screen,
                Screen::ConfirmDelete(DeletePhase::Deleting { .. })
            ) {
                self.ensure_terminal()?;
                self.delete_step()?
            } else {
                self.ensure_terminal()?;
                self.input_cycle(WaitMode::Blocking)?
            };
            if flow == Flow::Stop {
                break;
            }
        }

        self.close_line()?;
        self.console.restore()?;
        let exit_code = if self.ctx.scan.has_fatal_error() { 1 } else { 0 };
        tracing::info!("Run loop finished on {} (exit {exit_code})", self.screen.name());
        Ok(RunOutcome { exit_code })
    }

    /// Bring up the full-screen terminal on first use.
    fn ensure_terminal(&mut self) -> Result<()> {
        if self.console.is_ready() {
            return Ok(());
        }
        self.close_line()?;
        self.console.ensure_ready()?;
        let (width, height) = self.console.size()?;
        self.ctx.viewport = Viewport::classify(width, height);
        Ok(())
    }

    /// Terminate a pending status line so nothing is drawn over it.
    fn close_line(&mut self) -> io::Result<()> {
        if self.ctx.line_open {
            self.console.finish_line()?;
            self.ctx.line_open = false;
        }
        Ok(())
    }

    fn scan_step(&mut self) -> Result<Flow> {
        if self.ctx.scan.has_fatal_error() {
            if self.console.is_ready() {
                return self.input_cycle(WaitMode::Blocking);
            }
            self.close_line()?;
            self.console.status_line(&progress::error_line(&self.ctx))?;
            self.console.finish_line()?;
            return Ok(Flow::Stop);
        }

        let Some(pipeline) = self.ctx.pipeline.as_mut() else {
            return Ok(Flow::Stop);
        };
        let step = pipeline.source.step(&mut self.ctx.scan, pipeline.sink.as_mut());
        if step == SourceStep::Finished && !self.ctx.scan.has_fatal_error() {
            return self.finish_scan();
        }
        self.input_cycle(WaitMode::Cadenced)
    }

    /// The source is exhausted: hand the tree to the browser, or end the
    /// run once the export is complete.
    fn finish_scan(&mut self) -> Result<Flow> {
        let Some(mut pipeline) = self.ctx.pipeline.take() else {
            return Ok(Flow::Stop);
        };
        tracing::info!(
            "Scan finished: {} items, {}",
            self.ctx.scan.items,
            format_size(self.ctx.scan.size, self.ctx.config.units)
        );

        let tree = match pipeline.sink.finish() {
            Ok(tree) => tree,
            Err(e) => {
                self.ctx
                    .scan
                    .set_fatal_error(Some(format_args!("Error writing to file: {e}")));
                return Ok(Flow::Continue);
            }
        };

        match tree {
            Some(tree) if pipeline.browsable => {
                tracing::info!("Tree ready: {} nodes", tree.len());
                self.ctx.set_tree(tree);
                self.screen = Screen::Browsing;
                Ok(Flow::Continue)
            }
            _ => {
                if self.ctx.config.ui == UiLevel::Line && !self.console.is_ready() {
                    self.write_status_line()?;
                }
                Ok(Flow::Stop)
            }
        }
    }

    fn delete_step(&mut self) -> Result<Flow> {
        let (target, result) = match &mut self.screen {
            Screen::ConfirmDelete(DeletePhase::Deleting { target, deleter }) => {
                (*target, deleter.step().map(|step| (step, deleter.removed())))
            }
            _ => return Ok(Flow::Continue),
        };

        match result {
            Ok((DeleteStep::Working, _)) => self.input_cycle(WaitMode::Cadenced),
            Ok((DeleteStep::Done, removed)) => {
                tracing::info!("Deletion finished: {removed} entries removed");
                if let Some(tree) = self.ctx.tree.as_mut() {
                    if let Some(parent) = tree.node(target).parent {
                        tree.remove_child(parent, target);
                    }
                }
                self.refresh_browse();
                self.screen = Screen::Browsing;
                Ok(Flow::Continue)
            }
            Err(e) => {
                tracing::warn!("Deletion failed: {e}");
                if let Some(tree) = self.ctx.tree.as_mut() {
                    delete::prune_deleted(tree, target);
                }
                self.refresh_browse();
                self.screen = Screen::ConfirmDelete(DeletePhase::Failed {
                    message: e.to_string(),
                });
                Ok(Flow::Continue)
            }
        }
    }

    fn refresh_browse(&mut self) {
        if let (Some(tree), Some(browse)) = (self.ctx.tree.as_ref(), self.ctx.browse.as_mut()) {
            browse.refresh(tree);
        }
    }

    /// Redraw if due, then take at most one input event.
    fn input_cycle(&mut self, mode: WaitMode) -> Result<Flow> {
        if !self.console.is_ready() {
            if self.ctx.config.ui == UiLevel::Line
                && self
                    .ctx
                    .scheduler
                    .should_redraw(WaitMode::Cadenced, self.clock.now_millis())
            {
                self.write_status_line()?;
            }
            return Ok(if mode.blocks() { Flow::Stop } else { Flow::Continue });
        }

        loop {
            if self.ctx.scheduler.should_redraw(mode, self.clock.now_millis()) {
                self.redraw()?;
            }
            let event = match self.console.next_event(mode.blocks()) {
                Ok(Some(event)) => event,
                Ok(None) => return Ok(Flow::Continue),
                Err(e) if is_terminal_stream_failure(&e) => {
                    tracing::info!("Terminal stream closed: {e}");
                    return Ok(Flow::Stop);
                }
                Err(e) => return Err(e.into()),
            };

            match event {
                Event::Resize(width, height) => {
                    self.ctx.viewport = Viewport::classify(width, height);
                    tracing::debug!("Resized to {width}x{height}");
                    self.redraw()?;
                }
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = screens::handle_key(&mut self.ctx, &mut self.screen, key);
                    return self.apply_action(action);
                }
                _ => return Ok(Flow::Continue),
            }
        }
    }

    fn apply_action(&mut self, action: Action) -> Result<Flow> {
        match action {
            Action::None => {}
            Action::Goto(screen) => {
                tracing::debug!("Screen {} -> {}", self.screen.name(), screen.name());
                self.screen = screen;
            }
            Action::SpawnShell(dir) => {
                self.console.suspend()?;
                let result = shell::run_shell(&dir);
                self.console.resume()?;
                self.screen = match result {
                    Ok(()) => Screen::Browsing,
                    Err(outcome) => Screen::ShellOut(outcome),
                };
            }
            Action::Quit => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    fn redraw(&mut self) -> io::Result<()> {
        let ctx = &self.ctx;
        let screen = &self.screen;
        self.console
            .draw(&mut |frame| screens::draw(frame, ctx, screen))
    }

    fn write_status_line(&mut self) -> io::Result<()> {
        let width = self
            .console
            .size()
            .map(|(w, _)| w as usize)
            .unwrap_or(FALLBACK_WIDTH);
        self.console
            .status_line(&progress::status_line(&self.ctx, width))?;
        self.ctx.line_open = true;
        Ok(())
    }
}
