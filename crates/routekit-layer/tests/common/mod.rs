#![allow(dead_code)]

use futures::future::FutureExt;
use routekit_layer::{BoxFuture, Context, Layer, LayerOptions, Middleware, Next, Result};
use serde_json::Value;

pub fn layer(path: &str, methods: &[&str]) -> Layer {
    Layer::new(path, methods, Vec::new(), LayerOptions::default())
        .unwrap_or_else(|e| panic!("Failed to build layer for {path}: {e}"))
}

/// Appends `label` to the `trail` array in the context state.
pub fn push_trail(ctx: &mut Context, label: &str) {
    let trail = ctx
        .state
        .entry("trail")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Value::Array(items) = trail {
        items.push(label.into());
    }
}

pub fn trail(ctx: &Context) -> Vec<String> {
    ctx.get_state("trail")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// A handler that records its label and continues.
pub fn recorder(label: &'static str) -> Middleware {
    Middleware::new(move |ctx, next| {
        push_trail(ctx, label);
        next.run(ctx)
    })
}

/// A parameter validator that records `name=value` and continues.
pub fn record_param<'a>(
    value: Option<String>,
    ctx: &'a mut Context,
    next: Next<'a>,
) -> BoxFuture<'a, Result<()>> {
    async move {
        push_trail(ctx, &format!("param={}", value.unwrap_or_default()));
        next.run(ctx).await
    }
    .boxed()
}
