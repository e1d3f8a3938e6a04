extern crate even;

use even::DomainEvent;

#[derive(Debug, DomainEvent)]
struct AccountOpened {
    owner: String,
}

fn main() {
    let event = AccountOpened {
        owner: String::from("ada"),
    };
    let _ = even::domain::DomainEvent::type_key(&event);
    let _ = event.owner;
}
