use eframe::egui::Vec2;

use super::physics::Simulation;

/// Pointer input in layout coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
}

/// Surfaced to the host so it can react (detail panels and the like).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragEvent {
    Started(String),
    Ended(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DragState {
    #[default]
    Idle,
    Dragging {
        index: usize,
    },
}

/// Single-pointer drag-to-pin state machine.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn dragged_index(&self) -> Option<usize> {
        match self.state {
            DragState::Idle => None,
            DragState::Dragging { index } => Some(index),
        }
    }

    pub fn handle(&mut self, event: PointerEvent, simulation: &mut Simulation) -> Option<DragEvent> {
        match (self.state, event) {
            (DragState::Idle, PointerEvent::Down(point)) => {
                let index = simulation.hit_test(point)?;
                simulation.pin(index, point);
                simulation.set_alpha_target(simulation.config().drag_alpha_target);
                simulation.restart();
                self.state = DragState::Dragging { index };

                let id = simulation.node(index)?.id.clone();
                tracing::debug!(%id, "drag started");
                Some(DragEvent::Started(id))
            }
            (DragState::Dragging { index }, PointerEvent::Move(point)) => {
                simulation.pin(index, point);
                None
            }
            (DragState::Dragging { .. }, PointerEvent::Up) => self.release(simulation),
            _ => None,
        }
    }

    /// Ends any active drag, as a pointer release would.
    pub fn cancel(&mut self, simulation: &mut Simulation) -> Option<DragEvent> {
        self.release(simulation)
    }

    fn release(&mut self, simulation: &mut Simulation) -> Option<DragEvent> {
        let DragState::Dragging { index } = std::mem::take(&mut self.state) else {
            return None;
        };

        simulation.unpin(index);
        simulation.set_alpha_target(0.0);
        // The tick budget counts from release so a long drag still cools down.
        simulation.restart();
        let id = simulation.node(index)?.id.clone();
        tracing::debug!(%id, "drag ended");
        Some(DragEvent::Ended(id))
    }
}
