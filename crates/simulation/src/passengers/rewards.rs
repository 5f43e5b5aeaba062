//! Delivery payout policy.
//!
//! Both windows are measured from the passenger's creation:
//!
//! | delivered after creation       | money               | points                  |
//! |--------------------------------|---------------------|-------------------------|
//! | `<= fast_bonus_window_ms`      | base + fast bonus   | base + fast bonus       |
//! | `<= delivery_time_limit_ms`    | base                | base                    |
//! | later                          | 0                   | base                    |
//!
//! Late deliveries pay no money but still earn the base points.

use crate::game_params::PassengerParams;

use super::types::Reward;

pub fn delivery_reward(created_at_ms: u64, delivered_at_ms: u64, params: &PassengerParams) -> Reward {
    let elapsed = delivered_at_ms.saturating_sub(created_at_ms);
    let fast = elapsed <= params.fast_bonus_window_ms;
    let on_time = elapsed <= params.delivery_time_limit_ms;

    let mut money = 0;
    let mut points = params.base_points;
    if on_time {
        money += params.base_reward_money;
    }
    if fast {
        money += params.fast_bonus_money;
        points += params.fast_bonus_points;
    }
    let happiness = if on_time {
        params.happiness_delivery_gain
    } else {
        -params.happiness_late_loss
    };

    Reward {
        money,
        points,
        happiness,
        fast,
        on_time,
    }
}
