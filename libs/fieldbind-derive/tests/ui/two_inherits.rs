use fieldbind::Mapped;

#[derive(Mapped, Default)]
struct Child {
    #[bind(inherit)]
    a: Base,
    #[bind(inherit)]
    b: Base,
}

#[derive(Mapped, Default)]
struct Base {
    #[bind]
    id: u64,
}

fn main() {}
