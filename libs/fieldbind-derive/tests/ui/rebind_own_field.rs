use fieldbind::Mapped;

#[derive(Mapped, Default)]
#[mapped(rebind(own = "k"))]
struct Child {
    #[bind(inherit)]
    base: Base,
    #[bind]
    own: u64,
}

#[derive(Mapped, Default)]
struct Base {
    #[bind]
    id: u64,
}

fn main() {}
