//! Bomb Arena headless runner
//!
//! Plays one round with simple scripted players and prints the final field
//! snapshot as JSON on stdout.
//!
//! Usage: `bomb-arena [rules.json] [--seed N] [--style simple|hold|precision] [--four]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bomb Arena (headless) starting...");

    if let Err(e) = native::run(std::env::args().skip(1).collect()) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is nothing to run here
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use bomb_arena::sim::{FieldSimulation, FixedStep, GameEvent, tick};
    use bomb_arena::{Action, HeldKeys, KickStyle, RuleConfig};

    /// Frame times fed to the fixed-step loop, cycled. Uneven on purpose so
    /// the accumulator has something to do.
    const FRAME_TIMES: [f32; 4] = [1.0 / 60.0, 1.0 / 30.0, 1.0 / 144.0, 1.0 / 50.0];

    /// Stop after this many frames even if the round somehow never ends
    const MAX_FRAMES: u32 = 100_000;

    struct Options {
        rules_path: Option<String>,
        seed: u64,
        style: Option<KickStyle>,
        four_players: bool,
    }

    fn parse_args(args: Vec<String>) -> Result<Options, String> {
        let mut options = Options {
            rules_path: None,
            seed: 1,
            style: None,
            four_players: false,
        };

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = args.next().ok_or("--seed needs a value")?;
                    options.seed = value
                        .parse()
                        .map_err(|_| format!("invalid seed: {}", value))?;
                }
                "--style" => {
                    let value = args.next().ok_or("--style needs a value")?;
                    options.style = Some(
                        KickStyle::from_str(&value)
                            .ok_or_else(|| format!("unknown kick style: {}", value))?,
                    );
                }
                "--four" => options.four_players = true,
                _ if options.rules_path.is_none() && !arg.starts_with("--") => {
                    options.rules_path = Some(arg);
                }
                _ => return Err(format!("unexpected argument: {}", arg)),
            }
        }
        Ok(options)
    }

    fn load_rules(options: &Options) -> Result<RuleConfig, Box<dyn std::error::Error>> {
        let mut config = match &options.rules_path {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                log::info!("Loaded rules from {}", path);
                RuleConfig::from_json(&json)?
            }
            None => RuleConfig::default(),
        };
        if let Some(style) = options.style {
            log::info!("Kick style: {}", style.as_str());
            config = config.with_kick_style(style);
        }
        if options.four_players {
            config.four_players = true;
        }
        Ok(config)
    }

    pub fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
        let options = parse_args(args)?;
        let config = load_rules(&options)?;
        let mut state = FieldSimulation::new(config, options.seed)?;

        let mut step = FixedStep::default();
        let mut keys = HeldKeys::new();
        let mut kicks = 0u32;
        let mut deaths = 0u32;
        let mut frame = 0u32;

        while !state.is_round_over() && frame < MAX_FRAMES {
            let substeps = step.advance(FRAME_TIMES[frame as usize % FRAME_TIMES.len()]);
            for _ in 0..substeps {
                drive_players(&state, &mut keys);
                for event in tick(&mut state, &keys) {
                    match event {
                        GameEvent::BombKicked { .. } => kicks += 1,
                        GameEvent::PlayerKilled { .. } => deaths += 1,
                        _ => {}
                    }
                }
            }
            frame += 1;
        }

        log::info!(
            "Finished after {} frames ({} ticks): {} kicks, {} deaths",
            frame,
            state.clock.elapsed_ticks(),
            kicks,
            deaths
        );

        let snapshot = state.snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        Ok(())
    }

    /// Each player chases the nearest armed bomb and kicks when it is close
    fn drive_players(state: &FieldSimulation, keys: &mut HeldKeys) {
        keys.release_all();
        let bomb_rules = &state.config.bomb;
        let reach = state.config.player.kick.reach;

        for player in state.players.iter().filter(|p| p.is_alive()) {
            let target = state
                .bombs
                .iter()
                .filter(|b| b.is_kickable(bomb_rules))
                .min_by(|a, b| {
                    a.pos
                        .distance_squared(player.pos)
                        .total_cmp(&b.pos.distance_squared(player.pos))
                });
            let Some(target) = target else {
                continue;
            };

            let delta = target.pos - player.pos;
            let controls = &player.controls;
            keys.set_action(controls, Action::Left, delta.x < -4.0);
            keys.set_action(controls, Action::Right, delta.x > 4.0);
            keys.set_action(controls, Action::Up, delta.y < -4.0);
            keys.set_action(controls, Action::Down, delta.y > 4.0);
            keys.set_action(controls, Action::Kick, delta.length() < reach);
        }
    }
}
