//! Dashscope multimodal generation adapter.
//!
//! Content items are `{"text": ..}` and `{"image": ..}` objects inside
//! `input.messages`; sampling settings go in `parameters`.

mod client;
mod conversions;
mod dto;

pub use client::DashscopeProvider;
pub use dto::{
    DashscopeContent, DashscopeInput, DashscopeMessage, DashscopeParameters, DashscopeRequest,
    DashscopeRequestBuilder, DashscopeResponse,
};
