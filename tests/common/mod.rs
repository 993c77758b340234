#![allow(dead_code)]

pub mod segment_server;
