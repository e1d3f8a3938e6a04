extern crate even;

use even::DomainEvent;

trait AccountEvent {}

#[derive(Debug, DomainEvent)]
#[even(name = "Bank.AuditRecord", module = "Bank", implements(dyn AccountEvent))]
struct AuditRecord;

#[derive(Debug, DomainEvent)]
#[even(name = "Bank.AccountClosed", module = "Bank")]
#[even(category = "accounts", event_type = "account-closed", storage_format = 2)]
#[even(implements(AuditRecord))]
struct AccountClosed;

fn main() {
    let key = even::TypeKey::declared::<AccountClosed>();
    assert!(key.is_a(&even::TypeKey::declared::<AuditRecord>()));
    assert!(key.is_a(&even::TypeKey::of::<dyn AccountEvent>()));
}
