use bevy::prelude::*;

use crate::components::HintText;
use crate::doors::DoorTarget;
use crate::streaming::MazeWorld;

const CONTROLS: &str =
    "Click to lock mouse • WASD • Space jump • Shift sprint • C crouch • E door • R random level • F11 fullscreen";
const DOOR_PROMPT: &str = "Press E to open/enter door";

pub fn hint_line(level_name: &str, door_targeted: bool) -> String {
    let hint = if door_targeted { DOOR_PROMPT } else { CONTROLS };
    format!("{level_name}\n{hint}")
}

pub fn spawn_hud(mut commands: Commands) {
    commands.spawn((
        Text::new(CONTROLS),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(12.0),
            bottom: Val::Px(12.0),
            ..default()
        },
        HintText,
    ));
}

pub fn update_hint_system(
    target: Res<DoorTarget>,
    world: Res<MazeWorld>,
    mut q: Query<&mut Text, With<HintText>>,
) {
    let Ok(mut text) = q.get_single_mut() else { return };
    let line = hint_line(world.level().name(), target.0.is_some());
    // only write on change so the text layout isn't rebuilt every frame
    if text.0 != line {
        text.0 = line;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_switches_to_door_prompt() {
        assert_eq!(hint_line("Level 0", true), "Level 0\nPress E to open/enter door");
        assert!(hint_line("Pocket", false).starts_with("Pocket\nClick to lock mouse"));
    }
}
