use even::DomainEvent;

#[derive(Debug, DomainEvent)]
struct Wrapped<T> {
    inner: T,
}

fn main() {
    let _ = Wrapped { inner: 1u8 }.inner;
}
