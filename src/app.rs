use color_eyre::eyre::Result;
use rand::{rngs::StdRng, SeedableRng};
use ratatui::layout::{Rect, Size};
use tokio::sync::mpsc;

use crate::{
    action::Action,
    components::{canvas::Canvas, snow::SnowSimulation, tree::TreeGenerator},
    config::Config,
    tui,
};

pub struct App {
    tick_rate: f64,
    frame_rate: f64,
    should_quit: bool,
    canvas: Canvas,
    tree: TreeGenerator<StdRng>,
    snow: SnowSimulation<StdRng>,
}

impl App {
    pub fn new(config: Config, tiers: usize) -> Result<Self> {
        let (width, height) = crossterm::terminal::size()?;
        let area = Size::new(width, height);

        let tree = TreeGenerator::new(tiers, &config.tree, area, StdRng::from_entropy())?;
        let snow = SnowSimulation::new(area, &config.snow, StdRng::from_entropy());
        log::info!("Growing a {tiers}-tier tree on a {width}x{height} terminal");

        Ok(Self {
            tick_rate: config.animation.tick_rate,
            frame_rate: config.animation.frame_rate,
            should_quit: false,
            canvas: Canvas::new(area),
            tree,
            snow,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel();

        let mut tui = tui::Tui::new()?;
        tui.tick_rate(self.tick_rate);
        tui.frame_rate(self.frame_rate);
        tui.enter()?;

        self.tree.render(&mut self.canvas);

        loop {
            if let Some(e) = tui.next().await {
                match e {
                    tui::Event::Quit => action_tx.send(Action::Quit)?,
                    tui::Event::Tick => action_tx.send(Action::Tick)?,
                    tui::Event::Render => action_tx.send(Action::Render)?,
                    tui::Event::Resize(x, y) => action_tx.send(Action::Resize(x, y))?,
                    tui::Event::Error => action_tx.send(Action::Error("Failed to read terminal event".into()))?,
                    tui::Event::Key(key) => {
                        log::info!("Got key {key:?}, stopping");
                        action_tx.send(Action::Quit)?
                    },
                }
            }

            while let Ok(action) = action_rx.try_recv() {
                if action != Action::Tick && action != Action::Render {
                    log::debug!("{action}");
                }
                match action {
                    Action::Tick => self.tick(),
                    Action::Quit => self.should_quit = true,
                    Action::Resize(w, h) => {
                        tui.resize(Rect::new(0, 0, w, h))?;
                        self.canvas.resize(Size::new(w, h));
                        self.render(&mut tui)?;
                    },
                    Action::Render => self.render(&mut tui)?,
                    Action::Error(msg) => log::error!("{msg}"),
                }
            }

            if self.should_quit {
                tui.stop()?;
                break;
            }
        }
        tui.exit()?;
        Ok(())
    }

    fn tick(&mut self) {
        let summary = self.snow.tick(&self.tree, &mut self.canvas);
        let painted = self.tree.animate_ornaments(&mut self.canvas);
        tracing::trace!(?summary, painted, falling = self.snow.snowflakes().len(), "tick");
    }

    fn render(&self, tui: &mut tui::Tui) -> Result<()> {
        tui.draw(|f| {
            let area = f.area();
            f.render_widget(&self.canvas, area);
        })?;
        Ok(())
    }
}
