//! Railway Shunting Puzzle Library
//!
//! A headless simulator for shunting puzzles: move engines, flip switches,
//! couple cars and rotate turntables until the goal occupancy is reached.

pub mod simulation;
