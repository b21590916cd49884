use std::collections::VecDeque;

use clap::Parser;
use probe_set::IntSet;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 4096)]
    target_capacity: usize,

    #[arg(short = 'r', long = "churn_rounds", default_value_t = 3)]
    churn_rounds: usize,
}

fn main() {
    let args = Args::parse();

    println!(
        "Creating IntSet with a capacity hint of {}",
        args.target_capacity
    );

    let mut set = IntSet::with_capacity(args.target_capacity);
    println!("Actual capacity: {} slots", set.capacity());

    let initial_capacity = set.capacity();
    let mut next = 0i32;

    println!("Filling with sequential values until the table grows...");
    while set.capacity() == initial_capacity {
        set.insert(next);
        next += 1;
    }
    println!(
        "Insert #{} grew the table: {} -> {} slots",
        set.len(),
        initial_capacity,
        set.capacity()
    );

    let filled = next;
    println!("Removing every even value to pile up tombstones...");
    let mut live = VecDeque::new();
    for value in 0..filled {
        if value % 2 == 0 {
            set.remove(value);
        } else {
            live.push_back(value);
        }
    }

    println!();
    set.debug_stats().print();
    set.print_probe_histogram();
    println!();

    for round in 1..=args.churn_rounds {
        let capacity_before = set.capacity();
        let mut pairs = 0usize;

        loop {
            let Some(oldest) = live.pop_front() else {
                panic!("churn ring should never be empty");
            };
            set.remove(oldest);
            let before = set.debug_stats().tombstones;
            set.insert(next);
            let after = set.debug_stats().tombstones;
            live.push_back(next);
            next += 1;
            pairs += 1;

            // A lone insert reuses at most one tombstone; losing more than
            // one means the compaction rebuild ran.
            if after + 1 < before {
                break;
            }
        }

        assert_eq!(
            set.capacity(),
            capacity_before,
            "tombstone sweeps must rebuild at the same capacity"
        );
        println!(
            "Churn round {}: tombstones swept after {} remove/insert pairs (capacity still {})",
            round,
            pairs,
            set.capacity()
        );
    }

    println!();
    set.debug_stats().print();
    set.print_probe_histogram();
}
