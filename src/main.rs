use std::{fs, process};

use setsim::{
    cache::{access_hierarchy, IsCache},
    config::Config,
    trace::{Instr, Trace},
};

fn main() {
    let mut args = pico_args::Arguments::from_env();
    let n_warm: u64 = args
        .opt_value_from_str("-w")
        .expect("-w should be an integer")
        .unwrap_or(50_000_000);
    let n_instr: u64 = args
        .opt_value_from_str("-i")
        .expect("-i should be an integer")
        .unwrap_or(100_000_000);
    let heartbeat_int: u64 = args
        .opt_value_from_str("-h")
        .expect("-h should be an integer")
        .unwrap_or(0);

    let config_str: String = if let Some(config_str) = args.opt_value_from_str("--config").unwrap()
    {
        config_str
    } else {
        let config_path: String = args
            .opt_value_from_str("-p")
            .unwrap()
            .expect("Must provide a config with --config <json> or -p <path>");
        fs::read_to_string(config_path).expect("Could not find config file")
    };
    let config: Config = serde_json::from_str(&config_str).expect("Malformed config");
    let mut caches = config.to_caches().unwrap_or_else(|err| {
        eprintln!("Bad cache config: {err}");
        process::exit(1);
    });

    let stats_path: String = args
        .opt_value_from_str("--json")
        .unwrap()
        .expect("Must provide output path with --json");

    let trace_path: String = args
        .opt_value_from_str("-t")
        .unwrap()
        .expect("Must provide a trace with -t");
    let inst_per_block: usize = args
        .opt_value_from_str("--buffer-size")
        .expect("--buffer-size must be an integer")
        .unwrap_or(1024 * 16);
    let blocks_per_queue: usize = args
        .opt_value_from_str("--queue-size")
        .expect("--queue-size must be an integer")
        .unwrap_or(32);

    let trace = Trace::read(trace_path.into(), inst_per_block, blocks_per_queue).unwrap();

    let mut instr_count: u64 = 0;
    let mut next_heartbeat = heartbeat_int;
    let mut warmup = n_warm > 0;
    let mut goal = if warmup { n_warm } else { n_instr };

    loop {
        let instr_block = trace.rec.recv().unwrap();
        instr_count += operate(&mut caches, &instr_block);
        if heartbeat_int != 0 && instr_count > next_heartbeat {
            println!("Instr: {instr_count}");
            while next_heartbeat < instr_count {
                next_heartbeat += heartbeat_int;
            }
        }

        if instr_count > goal {
            if warmup {
                caches.iter_mut().for_each(|c| c.clear_stats());
                goal = instr_count + n_instr;
                warmup = false;
                println!("Finished Warmup!")
            } else {
                break;
            }
        }
    }
    println!("Ran {instr_count} instructions");

    let stats = caches
        .iter()
        .map(|c| c.make_stats(instr_count))
        .collect::<Vec<_>>();

    let stats_file = fs::File::create(stats_path).expect("Cannot open output file");
    serde_json::to_writer_pretty(stats_file, &stats).unwrap();
}

/// Run a block of instructions through the hierarchy. Returns the
/// instructions executed.
fn operate(caches: &mut [Box<dyn IsCache>], instrs: &[Instr]) -> u64 {
    for instr in instrs {
        for addr in instr.addresses() {
            access_hierarchy(caches, addr, false);
        }
    }
    instrs.len() as u64
}
