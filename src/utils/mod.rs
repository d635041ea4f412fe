// src/utils/mod.rs

pub mod comment_tree;
pub mod hash;
pub mod html;
pub mod jwt;
pub mod pagination;
pub mod slug;
pub mod timesince;
