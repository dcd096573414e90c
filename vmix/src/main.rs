extern crate clap;

use crossbeam_channel::{bounded, Receiver};
use ctrlc;
use env_logger;
use log::{error, info, warn};

use vmix_core::consts::{unit, MEMORY_NUM_WORDS};
use vmix_core::{Clock, ManualClock, SystemClock, Word};
use vmix_periph::{
    CardReader, Channel, Disk, IoDevice, IoOp, IoRequest, LinePrinter, Tape, TypeWriter,
};

use std::convert::TryFrom;
use std::io;
use std::ops::Range;

fn fetch_config<'a>() -> clap::ArgMatches<'a> {
    let about = "vMIX peripheral units driven from the command line";
    let c = clap::App::new("vMIX Peripherals")
        .version("0.1")
        .about(about)
        .arg(
            clap::Arg::with_name("realtime")
                .long("realtime")
                .help("Wait out device delays on the wall clock instead of skipping them"),
        )
        .subcommand(
            clap::SubCommand::with_name("type")
                .about("Echo typewriter input (stdin) on the line printer (stdout)"),
        )
        .subcommand(
            clap::SubCommand::with_name("dump")
                .about("Print blocks of a tape or disk file on the line printer")
                .arg(
                    clap::Arg::with_name("kind")
                        .index(1)
                        .required(true)
                        .possible_values(&["tape", "disk"])
                        .help("Kind of media stored in the file"),
                )
                .arg(
                    clap::Arg::with_name("filename")
                        .index(2)
                        .required(true)
                        .help("Backing file of the media"),
                )
                .arg(
                    clap::Arg::with_name("start")
                        .long("start")
                        .takes_value(true)
                        .default_value("0")
                        .help("First block to print"),
                )
                .arg(
                    clap::Arg::with_name("count")
                        .long("count")
                        .takes_value(true)
                        .default_value("1")
                        .help("Number of blocks to print"),
                ),
        )
        .subcommand(
            clap::SubCommand::with_name("cards")
                .about("Copy a card deck onto a tape, one card per block")
                .arg(
                    clap::Arg::with_name("deck")
                        .index(1)
                        .required(true)
                        .help("Directory prefix of the card files"),
                )
                .arg(
                    clap::Arg::with_name("tape")
                        .index(2)
                        .required(true)
                        .help("Backing file of the tape"),
                )
                .arg(
                    clap::Arg::with_name("count")
                        .long("count")
                        .takes_value(true)
                        .default_value("1")
                        .help("Number of cards to copy"),
                ),
        );
    c.get_matches()
}

fn parse_count(matches: &clap::ArgMatches, name: &str) -> Option<usize> {
    let value = matches.value_of(name).unwrap_or("0");
    match value.parse::<usize>() {
        Ok(x) => Some(x),
        Err(_x) => {
            error!("Invalid value for --{}: {:?}", name, value);
            None
        }
    }
}

///
/// How the front end lets time pass while a unit is busy.
///
enum Pace<'c> {
    // Jump the simulated clock straight to the moment the unit is ready
    Simulated(&'c ManualClock),
    Realtime,
}

impl<'c> Pace<'c> {
    fn wait(&self, ready_at: Option<u64>) {
        match self {
            Pace::Simulated(clock) => {
                if let Some(t) = ready_at {
                    if t > clock.now_ms() {
                        clock.set(t);
                    }
                }
            }
            Pace::Realtime => {
                std::thread::sleep(std::time::Duration::new(0, 5000000));
            }
        }
    }
}

///
/// Feeds `reqs` through the channel until all of them completed.
///
/// # Return Value
///
///  - `false` if interrupted by a ctrl-c before finishing.
///
fn run_channel(
    channel: &mut Channel,
    memory: &mut [Word],
    reqs: &[IoRequest],
    pace: &Pace,
    ctrlc_rx: &Receiver<()>,
) -> bool {
    let mut reqs = reqs.iter();
    let mut exhausted = false;
    loop {
        if ctrlc_rx.len() > 0 {
            return false;
        }

        while !exhausted && !channel.is_full() {
            match reqs.next() {
                Some(r) => {
                    channel.submit(*r);
                }
                None => exhausted = true,
            }
        }

        if exhausted && channel.is_idle() {
            return true;
        }

        match channel.step(memory) {
            Some(c) => {
                if !c.ok {
                    warn!("Unit {} refused {:?}", c.request.unit, c.request.op);
                }
            }
            None => pace.wait(channel.ready_at()),
        }
    }
}

fn request(unit: usize, op: IoOp, addr: usize) -> IoRequest {
    IoRequest {
        unit: unit,
        op: op,
        addr: addr,
    }
}

fn run_typewriter(clock: &dyn Clock, pace: &Pace, ctrlc_rx: &Receiver<()>) {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut tw = TypeWriter::new(&mut input, clock);
    let mut lp = LinePrinter::new(&mut out, clock);
    let tw_words = tw.block_size();

    // Sized for the printer, the typewriter only fills the leading words
    let mut line = vec![Word::default(); lp.block_size()];
    loop {
        if ctrlc_rx.len() > 0 {
            break;
        }

        if tw.busy() || lp.busy() {
            pace.wait(Some(std::cmp::max(tw.busy_until(), lp.busy_until())));
            continue;
        }

        tw.input(&mut line[..tw_words]);
        if tw.at_eof() && line.iter().all(|w| *w == Word::default()) {
            break;
        }
        lp.output(&line);
        if tw.at_eof() {
            break;
        }
    }
}

// Blocks visited by a dump of `count` blocks starting at `start`.
fn dump_blocks(start: usize, count: usize) -> Option<Range<usize>> {
    start.checked_add(count).map(|end| start..end)
}

fn run_dump(matches: &clap::ArgMatches, clock: &dyn Clock, pace: &Pace, ctrlc_rx: &Receiver<()>) {
    let (start, count) = match (parse_count(matches, "start"), parse_count(matches, "count")) {
        (Some(s), Some(c)) => (s, c),
        _ => return,
    };
    let kind = matches.value_of("kind").unwrap_or("tape");
    let filename = matches.value_of("filename").unwrap_or_default();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut memory = vec![Word::default(); MEMORY_NUM_WORDS];
    let mut channel = Channel::new();
    channel.attach(unit::LINE_PRINTER, Box::new(LinePrinter::new(&mut out, clock)));

    let mut reqs = Vec::new();
    let media_unit = match kind {
        "disk" => {
            channel.attach(unit::DISK_FIRST, Box::new(Disk::new(filename, clock)));
            unit::DISK_FIRST
        }
        _ => {
            channel.attach(unit::TAPE_FIRST, Box::new(Tape::new(filename, clock)));
            // Tapes can only be spaced forward by reading over the blocks
            for _ in 0..start {
                reqs.push(request(unit::TAPE_FIRST, IoOp::In, 0));
            }
            unit::TAPE_FIRST
        }
    };

    let media = channel.device(media_unit);
    let printer = channel.device(unit::LINE_PRINTER);
    let (block_words, line_words) = match (media, printer) {
        (Some(m), Some(p)) => (m.block_size(), p.block_size()),
        _ => return,
    };

    let blocks = match dump_blocks(start, count) {
        Some(r) => r,
        None => {
            error!("Dump of {} blocks from block {} is out of range", count, start);
            return;
        }
    };

    for block in blocks {
        if media_unit == unit::DISK_FIRST {
            match u32::try_from(block) {
                Ok(b) => reqs.push(request(media_unit, IoOp::Ioc(b), 0)),
                Err(_) => {
                    error!("Block {} cannot be addressed on the disk", block);
                    return;
                }
            }
        }
        reqs.push(request(media_unit, IoOp::In, 0));
        for addr in (0..block_words).step_by(line_words) {
            reqs.push(request(unit::LINE_PRINTER, IoOp::Out, addr));
        }
    }

    if !run_channel(&mut channel, &mut memory, &reqs, pace, ctrlc_rx) {
        warn!("Dump interrupted");
    }
}

fn run_cards(matches: &clap::ArgMatches, clock: &dyn Clock, pace: &Pace, ctrlc_rx: &Receiver<()>) {
    let count = match parse_count(matches, "count") {
        Some(c) => c,
        None => return,
    };
    let deck = matches.value_of("deck").unwrap_or_default();
    let tape = matches.value_of("tape").unwrap_or_default();

    let mut memory = vec![Word::default(); MEMORY_NUM_WORDS];
    let mut channel = Channel::new();
    channel.attach(unit::CARD_READER, Box::new(CardReader::new(deck, clock)));
    channel.attach(unit::TAPE_FIRST, Box::new(Tape::new(tape, clock)));

    let mut reqs = Vec::new();
    for _ in 0..count {
        reqs.push(request(unit::CARD_READER, IoOp::In, 0));
        reqs.push(request(unit::TAPE_FIRST, IoOp::Out, 0));
    }

    if run_channel(&mut channel, &mut memory, &reqs, pace, ctrlc_rx) {
        info!("Copied {} cards from {:?} to {:?}", count, deck, tape);
    } else {
        warn!("Card copy interrupted");
    }
}

fn main() {
    env_logger::init();

    // Register for a ctrlc handler which will push a signal to the application.
    // If the signal handler is pushed multiple times without closing, then force
    // closing the application.
    let (ctrlc_tx, ctrlc_rx) = bounded(1);
    let res = ctrlc::set_handler(move || {
        if ctrlc_tx.is_full() == true {
            std::process::exit(-1);
        }
        let _res = ctrlc_tx.send(());
    });

    match res {
        Err(x) => {
            error!("Unable to register signal handler. {:?}.", x);
            return;
        }
        _ => {}
    }

    let matches = fetch_config();

    let manual_clock = ManualClock::new();
    let system_clock = SystemClock::new();
    let realtime = matches.is_present("realtime");
    let clock: &dyn Clock = if realtime {
        &system_clock
    } else {
        &manual_clock
    };
    let pace = if realtime {
        Pace::Realtime
    } else {
        Pace::Simulated(&manual_clock)
    };

    match matches.subcommand() {
        ("type", Some(_)) => run_typewriter(clock, &pace, &ctrlc_rx),
        ("dump", Some(sub)) => run_dump(sub, clock, &pace, &ctrlc_rx),
        ("cards", Some(sub)) => run_cards(sub, clock, &pace, &ctrlc_rx),
        _ => {
            error!("Invalid subcommand. Exiting");
        }
    }
}
