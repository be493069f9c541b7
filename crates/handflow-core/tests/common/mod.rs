//! Synthetic hand poses shared by the integration tests.
//!
//! Hands are upright in image space (y grows downwards): wrist at the
//! bottom, fingers pointing up. An extended finger's tip sits twice as far
//! from the wrist as its MCP; a curled one sits just past halfway to it.

#![allow(dead_code)]

use handflow_core::{Finger, HandLandmarks, LandmarkIndex, Vec3};

pub const WRIST: Vec3 = Vec3::new(0.5, 0.8, 0.0);

const EXTENDED_REACH: f32 = 2.0;
const CURLED_REACH: f32 = 0.55;

fn mcp(finger: Finger) -> Vec3 {
    match finger {
        Finger::Thumb => Vec3::new(0.36, 0.72, 0.0),
        Finger::Index => Vec3::new(0.44, 0.60, 0.0),
        Finger::Middle => Vec3::new(0.50, 0.58, 0.0),
        Finger::Ring => Vec3::new(0.55, 0.60, 0.0),
        Finger::Pinky => Vec3::new(0.60, 0.63, 0.0),
    }
}

/// Build a hand with each finger (thumb first) either extended or curled.
pub fn pose(extended: [bool; 5]) -> HandLandmarks {
    let mut points = [Vec3::ZERO; 21];
    points[LandmarkIndex::Wrist.index()] = WRIST;

    for (finger, is_extended) in Finger::ALL.into_iter().zip(extended) {
        let base = mcp(finger);
        let reach = if is_extended {
            EXTENDED_REACH
        } else {
            CURLED_REACH
        };
        let tip = WRIST + (base - WRIST) * reach;
        let m = finger.mcp().index();
        let t = finger.tip().index();

        points[m] = base;
        points[m + 1] = base.lerp(tip, 1.0 / 3.0);
        points[m + 2] = base.lerp(tip, 2.0 / 3.0);
        points[t] = tip;
    }
    points[LandmarkIndex::ThumbCmc.index()] = WRIST.lerp(mcp(Finger::Thumb), 0.5);

    HandLandmarks::from_points(&points).unwrap()
}

pub fn open_hand() -> HandLandmarks {
    pose([true; 5])
}

pub fn fist() -> HandLandmarks {
    pose([false; 5])
}

pub fn pointing() -> HandLandmarks {
    pose([false, true, false, false, false])
}

pub fn victory() -> HandLandmarks {
    pose([false, true, true, false, false])
}

pub fn thumbs_up() -> HandLandmarks {
    pose([true, false, false, false, false])
}

/// Thumbs-up turned upside down around the wrist.
pub fn thumbs_down() -> HandLandmarks {
    rotate_half_turn(&thumbs_up())
}

/// Open hand with the thumb tip moved onto the index tip.
pub fn pinching_open_hand() -> HandLandmarks {
    let hand = open_hand();
    let mut points = *hand.points();
    points[LandmarkIndex::ThumbTip.index()] = points[LandmarkIndex::IndexTip.index()];
    HandLandmarks::from_points(&points).unwrap()
}

pub fn rotate_half_turn(hand: &HandLandmarks) -> HandLandmarks {
    let points: Vec<Vec3> = hand
        .points()
        .iter()
        .map(|&p| {
            let offset = p - WRIST;
            WRIST + Vec3::new(-offset.x, -offset.y, offset.z)
        })
        .collect();
    HandLandmarks::from_points(&points).unwrap()
}

/// Same pose shifted in image space.
pub fn translated(hand: &HandLandmarks, offset: Vec3) -> HandLandmarks {
    let points: Vec<Vec3> = hand.points().iter().map(|&p| p + offset).collect();
    HandLandmarks::from_points(&points).unwrap()
}
