// SPDX-License-Identifier: MIT OR Apache-2.0
//! Mock game menu and the tour that walks through it.

use egui::{Rect, Sense, Vec2};
use guided_tour_core::{ContainerFrame, Step, TourController, TourSettings};
use guided_tour_egui::{EguiOverlayView, WidgetRegistry};
use std::cell::Cell;
use std::rc::Rc;

const PLAY: &str = "play_button";
const SHOP_CARD: &str = "shop_card";
const SHOP_ICON: &str = "shop_icon";
const BANNER: &str = "news_banner";
const BONUS: &str = "bonus_button";

/// Coins granted when the shop step completes
const SHOP_REWARD: u32 = 50;

/// Menu widgets, overlay, and tour controller
pub struct DemoScene {
    registry: Rc<WidgetRegistry>,
    overlay: Rc<EguiOverlayView>,
    controller: TourController,
    coins: Rc<Cell<u32>>,
    show_bonus: bool,
}

impl DemoScene {
    /// Register the menu widgets and wire the tour
    pub fn new(settings: &TourSettings) -> Self {
        let registry = Rc::new(WidgetRegistry::new());
        registry.register_button(PLAY, None);
        registry.register_button(SHOP_CARD, None);
        // The icon has no button of its own; its card does
        registry.register(SHOP_ICON, Some(SHOP_CARD));
        registry.register(BANNER, None);
        registry.register_button(BONUS, None);

        let initial = Rect::from_min_size(egui::Pos2::ZERO, Vec2::new(1600.0, 900.0));
        let overlay = Rc::new(EguiOverlayView::new(settings, ContainerFrame::identity(initial)));

        let controller = TourController::initialize(overlay.clone(), registry.clone(), settings.presenter);
        controller.set_resolver(registry.clone());

        Self {
            registry,
            overlay,
            controller,
            coins: Rc::new(Cell::new(0)),
            show_bonus: false,
        }
    }

    /// Start the tour from the first step
    pub fn start_tour(&self) {
        let coins = self.coins.clone();
        let steps = vec![
            Step::new("play", "Tap Play to jump into a match")
                .on_enter(|| tracing::info!("Tour started")),
            Step::new("shop", "Upgrades live in the shop. Open it from its card")
                .on_completed(move || {
                    coins.set(coins.get() + SHOP_REWARD);
                    tracing::info!("Granted {} coins for visiting the shop", SHOP_REWARD);
                }),
            Step::new("news", "News and events show up here. Tap the banner to continue"),
            Step::new("bonus", "Claim your daily bonus")
                .on_completed(|| tracing::info!("Tour finished")),
        ];

        if let Err(e) = self.controller.play_by_key(steps, &[PLAY, SHOP_ICON, BANNER, BONUS]) {
            tracing::warn!("Could not start tour: {e}");
        }
    }

    /// Stop the tour
    pub fn stop_tour(&self) {
        self.controller.stop();
    }

    /// Lay out one frame
    pub fn update(&mut self, ctx: &egui::Context) {
        self.handle_shortcuts(ctx);
        self.registry.begin_frame();

        egui::TopBottomPanel::top("demo_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Guided tour demo");
                ui.separator();
                self.registry.label(ui, BANNER, "Season 3 is live!");
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(format!("Coins: {}", self.coins.get()));
            ui.add_space(12.0);

            self.registry.button(ui, PLAY, "Play");
            ui.add_space(12.0);

            let card = ui
                .group(|ui| {
                    ui.horizontal(|ui| {
                        self.registry.label(ui, SHOP_ICON, "[$]");
                        ui.label("Shop");
                    });
                })
                .response
                .interact(Sense::click());
            self.registry.record_response(SHOP_CARD, &card);
            ui.add_space(12.0);

            ui.checkbox(&mut self.show_bonus, "Show bonus");
            if self.show_bonus {
                self.registry.button(ui, BONUS, "Claim bonus");
            }

            ui.add_space(24.0);
            ui.weak("T: start tour    Y: stop tour");
        });

        self.overlay.set_container(ContainerFrame::identity(ctx.screen_rect()));
        self.controller.tick(ctx.input(|i| i.stable_dt));
        self.overlay.ui(ctx);
    }

    fn handle_shortcuts(&self, ctx: &egui::Context) {
        let (start, stop) = ctx.input(|input| {
            (input.key_pressed(egui::Key::T), input.key_pressed(egui::Key::Y))
        });

        if start {
            self.start_tour();
        }
        if stop {
            self.stop_tour();
        }
    }
}
