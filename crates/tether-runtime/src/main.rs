// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Headless runner: loads a scene file, steps it for a number of frames of
//! fixed wall-clock length, then prints where every named entity ended up.
//!
//! Usage: `tether-runtime <scene.json> [frames] [frame-ms]`

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tether_sdk::prelude::*;

const DEFAULT_FRAMES: u32 = 120;
const DEFAULT_FRAME_MS: u64 = 16;

struct Args {
    scene: String,
    frames: u32,
    frame: Duration,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let Some(scene) = args.next() else {
        bail!("usage: tether-runtime <scene.json> [frames] [frame-ms]");
    };
    let frames = match args.next() {
        Some(value) => value.parse().context("frames must be a whole number")?,
        None => DEFAULT_FRAMES,
    };
    let frame_ms = match args.next() {
        Some(value) => value.parse().context("frame-ms must be a whole number")?,
        None => DEFAULT_FRAME_MS,
    };
    Ok(Args {
        scene,
        frames,
        frame: Duration::from_millis(frame_ms),
    })
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let registry = SystemRegistry::init();
    let definition = SceneDefinition::load(&args.scene)?;
    let mut scene = Scene::from_definition(&definition, &registry)?;

    log::info!(
        "Running {} for {} frames of {:?}",
        args.scene,
        args.frames,
        args.frame
    );
    for _ in 0..args.frames {
        scene.update(args.frame);
    }

    let transforms: BTreeMap<&str, Option<Transform2D>> = scene
        .named_entities()
        .map(|(name, entity)| (name, scene.world().get::<Transform2D>(entity)))
        .collect();
    println!("{}", serde_json::to_string_pretty(&transforms)?);
    Ok(())
}
