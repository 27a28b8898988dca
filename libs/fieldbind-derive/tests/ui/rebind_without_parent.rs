use fieldbind::Mapped;

#[derive(Mapped, Default)]
#[mapped(rebind(id = "key"))]
struct Lonely {
    #[bind]
    id: u64,
}

fn main() {}
