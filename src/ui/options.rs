use gtk4::{self, glib, prelude::*};
use std::rc::Rc;
use tracing::debug;

use crate::config::{AspectMode, InterfaceConfig};
use crate::core::adjustments::{AdjustStep, Adjustment, Flip, Rotation};
use crate::core::aspect::AspectRatio;
use crate::core::{OptionsSnapshot, UserCommand};

type Send = Rc<dyn Fn(UserCommand)>;

struct SpinRow {
    adjustment: Adjustment,
    spin: gtk4::SpinButton,
    handler: glib::SignalHandlerId,
}

/// Video, audio and subtitle options behind the header bar's options button.
#[derive(Clone)]
pub struct OptionsMenu {
    pub button: gtk4::MenuButton,
    spins: Rc<Vec<SpinRow>>,
    flip_box: gtk4::Box,
    aspect_dropdown: gtk4::DropDown,
    aspect_handler: Rc<glib::SignalHandlerId>,
    aspect_cycle: gtk4::Button,
}

impl std::fmt::Debug for OptionsMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsMenu")
            .field("button", &"gtk4::MenuButton")
            .field("spins", &self.spins.len())
            .finish()
    }
}

fn icon_button(icon: &str, tooltip: &str) -> gtk4::Button {
    gtk4::Button::builder()
        .icon_name(icon)
        .tooltip_text(tooltip)
        .css_classes(vec!["flat"])
        .build()
}

fn row(label: &str) -> gtk4::Box {
    let row = gtk4::Box::builder()
        .orientation(gtk4::Orientation::Horizontal)
        .spacing(6)
        .build();
    row.append(
        &gtk4::Label::builder()
            .label(label)
            .xalign(0.0)
            .hexpand(true)
            .build(),
    );
    row
}

impl OptionsMenu {
    pub fn new(send: Send) -> Self {
        let content = gtk4::Box::builder()
            .orientation(gtk4::Orientation::Vertical)
            .spacing(8)
            .margin_top(8)
            .margin_bottom(8)
            .margin_start(8)
            .margin_end(8)
            .build();

        // Aspect: a dropdown or a cycling button depending on the layout
        let aspect_row = row("Aspect Ratio");
        let labels: Vec<&str> = AspectRatio::ALL.iter().map(|a| a.label()).collect();
        let aspect_dropdown = gtk4::DropDown::from_strings(&labels);
        let send_aspect = send.clone();
        let aspect_handler = aspect_dropdown.connect_selected_notify(move |dropdown| {
            let ratio = AspectRatio::from_index(dropdown.selected() as usize);
            send_aspect(UserCommand::SetAspect(ratio));
        });
        let aspect_cycle = gtk4::Button::builder()
            .label(AspectRatio::Original.label())
            .build();
        let send_cycle = send.clone();
        aspect_cycle.connect_clicked(move |_| send_cycle(UserCommand::CycleAspect));
        let aspect_reset = icon_button("edit-undo-symbolic", "Reset");
        let send_aspect_reset = send.clone();
        aspect_reset.connect_clicked(move |_| {
            send_aspect_reset(UserCommand::SetAspect(AspectRatio::Original))
        });
        aspect_row.append(&aspect_dropdown);
        aspect_row.append(&aspect_cycle);
        aspect_row.append(&aspect_reset);
        content.append(&aspect_row);

        let rotate_row = row("Rotate");
        for (icon, tooltip, rotation) in [
            ("object-rotate-left-symbolic", "Rotate Left", Rotation::Left),
            ("object-rotate-right-symbolic", "Rotate Right", Rotation::Right),
            ("edit-undo-symbolic", "Reset", Rotation::Reset),
        ] {
            let button = icon_button(icon, tooltip);
            let send = send.clone();
            button.connect_clicked(move |_| send(UserCommand::Rotate(rotation)));
            rotate_row.append(&button);
        }
        content.append(&rotate_row);

        let flip_box = row("Flip");
        for (icon, tooltip, flip) in [
            ("object-flip-horizontal-symbolic", "Flip Horizontally", Flip::Horizontal),
            ("object-flip-vertical-symbolic", "Flip Vertically", Flip::Vertical),
            ("edit-undo-symbolic", "Reset", Flip::Reset),
        ] {
            let button = icon_button(icon, tooltip);
            let send = send.clone();
            button.connect_clicked(move |_| send(UserCommand::Flip(flip)));
            flip_box.append(&button);
        }
        content.append(&flip_box);

        content.append(&gtk4::Separator::new(gtk4::Orientation::Horizontal));

        let mut spins = Vec::with_capacity(Adjustment::ALL.len());
        for adjustment in Adjustment::ALL {
            let (lower, upper) = adjustment.range();
            let spin = gtk4::SpinButton::with_range(lower, upper, adjustment.step());
            spin.set_digits(adjustment.digits());
            spin.set_value(adjustment.default_value());
            spin.set_width_chars(6);

            let send_value = send.clone();
            let handler = spin.connect_value_changed(move |spin| {
                send_value(UserCommand::Adjust(adjustment, AdjustStep::Set(spin.value())));
            });

            let reset = icon_button("edit-undo-symbolic", "Reset");
            let send_reset = send.clone();
            reset.connect_clicked(move |_| {
                send_reset(UserCommand::Adjust(adjustment, AdjustStep::Reset))
            });

            let spin_row = row(adjustment.label());
            spin_row.append(&spin);
            spin_row.append(&reset);
            content.append(&spin_row);

            spins.push(SpinRow {
                adjustment,
                spin,
                handler,
            });
        }

        let reset_all = gtk4::Button::builder()
            .label("Reset All")
            .css_classes(vec!["destructive-action"])
            .build();
        let send_reset_all = send.clone();
        reset_all.connect_clicked(move |_| send_reset_all(UserCommand::ResetAllOptions));
        content.append(&reset_all);

        let popover = gtk4::Popover::builder().child(&content).build();
        let button = gtk4::MenuButton::builder()
            .icon_name("preferences-video-symbolic")
            .tooltip_text("Options")
            .popover(&popover)
            .build();

        Self {
            button,
            spins: Rc::new(spins),
            flip_box,
            aspect_dropdown,
            aspect_handler: Rc::new(aspect_handler),
            aspect_cycle,
        }
    }

    /// Fill the widgets with engine values when the popover opens.
    pub fn show_snapshot(&self, snapshot: &OptionsSnapshot) {
        self.flip_box.set_visible(snapshot.flip_available);
        if let Some(ratio) = snapshot.aspect {
            self.set_aspect(ratio);
        }
        for (adjustment, value) in &snapshot.adjustments {
            self.set_adjustment(*adjustment, *value);
        }
    }

    pub fn set_adjustment(&self, adjustment: Adjustment, value: f64) {
        let Some(row) = self.spins.iter().find(|r| r.adjustment == adjustment) else {
            return;
        };
        if (row.spin.value() - value).abs() > f64::EPSILON {
            row.spin.block_signal(&row.handler);
            row.spin.set_value(value);
            row.spin.unblock_signal(&row.handler);
        }
    }

    pub fn set_aspect(&self, ratio: AspectRatio) {
        let index = ratio.index() as u32;
        if self.aspect_dropdown.selected() != index {
            self.aspect_dropdown.block_signal(&self.aspect_handler);
            self.aspect_dropdown.set_selected(index);
            self.aspect_dropdown.unblock_signal(&self.aspect_handler);
        }
        self.aspect_cycle.set_label(ratio.label());
    }

    pub fn apply_interface(&self, interface: &InterfaceConfig) {
        debug!("Options layout: {:?}", interface);
        self.button.set_visible(interface.options_popover);
        let dropdown = interface.aspect_mode == AspectMode::Dropdown;
        self.aspect_dropdown.set_visible(dropdown);
        self.aspect_cycle.set_visible(!dropdown);
    }
}
