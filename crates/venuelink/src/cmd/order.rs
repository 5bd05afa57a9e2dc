use std::time::{SystemTime, UNIX_EPOCH};

use venuelink_wire::Order;

use crate::cmd::{parse_duration, OrderArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: OrderArgs, format: OutputFormat) -> CliResult<i32> {
    let recv_timeout = parse_duration(&args.recv_timeout)?;
    let mut client = args.session.open_session()?;

    let order = Order {
        id: args.id,
        created: unix_micros(),
        ticker: args.ticker.clone(),
        quantity: args.quantity,
        price: args.price,
        action: args.action.into(),
    };
    client
        .send_order(&order)
        .map_err(|err| client_error("order submission failed", err))?;

    for _ in 0..args.await_statuses {
        let msg = client
            .receive_downstream(recv_timeout)
            .map_err(|err| client_error("awaiting order status failed", err))?;
        print_message(&msg, format);
    }

    client.close();
    Ok(SUCCESS)
}

fn unix_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}
