//! Ragdoll arena
//!
//! Physics-driven ragdoll enemies for a small arena shooter. The force model
//! ([`stabilizer`], [`joint`], [`repulsor`]) is engine-agnostic and works on
//! any [`body::RigidBodyHandle`]; [`simulation`] bridges it to Bevy and Rapier,
//! and the gameplay modules compose it into enemies that chase the player,
//! lose limbs to the player's [`weapon`] and fall over when decapitated.

pub mod appendage;
pub mod body;
pub mod config;
pub mod constants;
pub mod enemy;
pub mod error;
pub mod joint;
pub mod math;
pub mod player;
pub mod repulsor;
pub mod session;
pub mod simulation;
pub mod spawner;
pub mod stabilizer;
pub mod weapon;
