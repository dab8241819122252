//! Skill pickups dropped by dead monsters.

use bevy::math::{IRect, IVec2};
use rand::Rng;

use crate::clock::Millis;
use crate::collision::Collidable;
use crate::constants::{GRAVITY, ITEM_HALF_SIZE, ITEM_LIFETIME_MS};
use crate::container::{FrameContext, SimEntity};
use crate::rigidbody::{rect, Rigidbody};
use crate::skill::SkillType;

/// Upward pop when the item appears
const DROP_VELOCITY: i32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    Normal,
    Picked,
}

#[derive(Debug, Clone)]
pub struct SkillItem {
    pub body: Rigidbody<ItemState>,
    pub skill: SkillType,
}

impl SkillItem {
    pub fn new(skill: SkillType, position: IVec2, now: Millis) -> Self {
        let mut body = Rigidbody::new(
            position,
            rect(-ITEM_HALF_SIZE, 0, ITEM_HALF_SIZE, 2 * ITEM_HALF_SIZE),
            ItemState::Normal,
            now,
        );
        body.velocity.y = DROP_VELOCITY;
        body.acceleration.y = GRAVITY;
        Self { body, skill }
    }

    /// Drop an item of a random skill type
    pub fn random<R: Rng>(position: IVec2, now: Millis, rng: &mut R) -> Self {
        let skill = SkillType::ALL[rng.gen_range(0..SkillType::ALL.len())];
        Self::new(skill, position, now)
    }

    pub fn visual_key(&self) -> &'static str {
        "item/skill"
    }

    /// Mark as collected; removed at the end of the frame
    pub fn pick(&mut self, now: Millis) {
        self.body.set_state(ItemState::Picked, now);
    }
}

impl SimEntity for SkillItem {
    fn frame_move(&mut self, ctx: &mut FrameContext<'_>) {
        if self.body.state() == ItemState::Normal {
            ctx.field.integrate_bounded(&mut self.body, ctx.dt);
        }
    }

    fn frame(&mut self, now: Millis) -> bool {
        self.body.state() == ItemState::Normal && self.body.state_time(now) < ITEM_LIFETIME_MS
    }
}

impl Collidable for SkillItem {
    fn global_range(&self) -> IRect {
        self.body.global_range()
    }

    fn is_collidable(&self) -> bool {
        self.body.state() == ItemState::Normal
    }
}
