use fieldbind::Mapped;

#[derive(Mapped, Default)]
struct Child {
    #[bind(inherit, key = "base")]
    base: Base,
}

#[derive(Mapped, Default)]
struct Base {
    #[bind]
    id: u64,
}

fn main() {}
