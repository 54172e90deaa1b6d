use bevy::prelude::*;

use crate::components::Player;

/// pixel snapping helper – keeps the camera on whole pixels so sprites never
/// land on half‑pixels and shimmer
#[inline]
fn snap(v: f32) -> f32 {
    v.round()
}

/// simple camera follow; no world clamping, the terrain is unbounded
///
/// NOTE: runs in **PostUpdate**, so all movement has been applied and
/// transforms are final for the frame.
pub fn camera_follow_system(
    mut cam_q: Query<&mut Transform, (With<Camera>, Without<Player>)>,
    player_q: Query<&Transform, With<Player>>,
) {
    let Ok(mut cam_tf) = cam_q.get_single_mut() else { return };
    let Ok(player_tf) = player_q.get_single() else { return };

    cam_tf.translation.x = snap(player_tf.translation.x);
    cam_tf.translation.y = snap(player_tf.translation.y);
}
