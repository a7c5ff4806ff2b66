//! Tank actions and their default bindings.
//!
//! Each tank entity carries its own `InputMap<TankAction>`. Before every
//! arbitration tick the action states are folded into an [`InputFrame`]
//! under the per-player axis names the core's keyboard source reads.

use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use leafwing_input_manager::prelude::*;
use tank_command::input::{ButtonState, InputFrame};

use crate::TankControlled;

/// Actions for driving one tank.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum TankAction {
    /// Throttle on Y, turn on X.
    #[actionlike(DualAxis)]
    Drive,
    /// Charge while held, fire on release.
    Fire,
}

/// Default bindings: player 1 on WASD + Space, player 2 on the arrow keys +
/// Enter. Other players start unbound.
pub fn default_input_map(player_index: u32) -> InputMap<TankAction> {
    match player_index {
        1 => InputMap::default()
            .with_dual_axis(TankAction::Drive, VirtualDPad::wasd())
            .with(TankAction::Fire, KeyCode::Space),
        2 => InputMap::default()
            .with_dual_axis(TankAction::Drive, VirtualDPad::arrow_keys())
            .with(TankAction::Fire, KeyCode::Enter),
        _ => InputMap::default(),
    }
}

/// Write one player's drive stick and fire button into `frame`.
///
/// Stick right turns the tank clockwise seen from above, which is a
/// negative rotation about +Y.
pub fn fold_player(frame: &mut InputFrame, player_index: u32, drive: Vec2, fire: ButtonState) {
    frame.set_axis(format!("Vertical{player_index}"), drive.y);
    frame.set_axis(format!("Horizontal{player_index}"), -drive.x);
    frame.set_button(format!("Fire{player_index}"), fire);
}

/// Fold every tank's action state into a frame.
pub(crate) fn gather_actions(
    frame: &mut InputFrame,
    tanks: &Query<(&TankControlled, &ActionState<TankAction>)>,
) {
    for (controlled, actions) in tanks {
        let fire = ButtonState {
            pressed: actions.just_pressed(&TankAction::Fire),
            held: actions.pressed(&TankAction::Fire),
            released: actions.just_released(&TankAction::Fire),
        };
        fold_player(
            frame,
            controlled.player_index,
            actions.clamped_axis_pair(&TankAction::Drive),
            fire,
        );
    }
}

/// Record touches and left clicks that started this frame.
pub(crate) fn gather_pointer(
    frame: &mut InputFrame,
    touches: Option<&Touches>,
    mouse: Option<&ButtonInput<MouseButton>>,
    window: Option<&Window>,
) {
    if let Some(touches) = touches {
        for touch in touches.iter_just_pressed() {
            frame.push_touch_began(touch.id(), touch.position());
        }
    }
    if mouse.is_some_and(|mouse| mouse.just_pressed(MouseButton::Left))
        && let Some(position) = window.and_then(Window::cursor_position)
    {
        frame.set_mouse_down(position);
    }
}

/// Give newly spawned tanks their default bindings.
pub(crate) fn attach_input_maps(
    mut commands: Commands,
    tanks: Query<(Entity, &TankControlled), (Added<TankControlled>, Without<InputMap<TankAction>>)>,
) {
    for (entity, controlled) in &tanks {
        commands.entity(entity).insert((
            default_input_map(controlled.player_index),
            ActionState::<TankAction>::default(),
        ));
    }
}

pub(crate) type PrimaryWindowQuery<'w, 's> = Query<'w, 's, &'static Window, With<PrimaryWindow>>;
