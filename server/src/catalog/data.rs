//! Compiled-in sample records and placeholder images.

use super::{Composition, Genre, ImageRef};

pub static COMPOSITIONS: &[Composition] = &[
    Composition {
        id: "1",
        slug: "poeira-da-estrada-por-leo-santos",
        title: "Poeira da Estrada",
        artist: "Léo Santos",
        genre: Genre::Sertanejo,
        mood: "Nostálgico",
        image_id: "sertanejo-1",
        lyrics: "Poeira da estrada, cheiro de chão molhado\nLembranças de um tempo que não volta mais\nO som da viola, o canto apaixonado\nHistórias que o vento não desfaz.",
    },
    Composition {
        id: "2",
        slug: "caminho-de-luz-por-ana-clara",
        title: "Caminho de Luz",
        artist: "Ana Clara",
        genre: Genre::Gospel,
        mood: "Inspirador",
        image_id: "gospel-1",
        lyrics: "Em cada passo, sinto Tua presença\nÉs o farol que guia meu caminhar\nNa escuridão, Tua luz é minha sentença\nÉs meu refúgio, meu porto seguro, meu altar.",
    },
    Composition {
        id: "3",
        slug: "noite-paulistana-por-mc-zilla",
        title: "Noite Paulistana",
        artist: "MC Zilla",
        genre: Genre::Trap,
        mood: "Urbano",
        image_id: "trap-1",
        lyrics: "Luzes de neon, a cidade não para\nConcreto e ambição, a selva me encara\nCada esquina uma história, cada olhar uma bala\nCorrendo pelo certo, na Babilônia que não cala.",
    },
    Composition {
        id: "4",
        slug: "danca-do-interior-por-pedro-lima",
        title: "Dança do Interior",
        artist: "Pedro Lima",
        genre: Genre::Piseiro,
        mood: "Animado",
        image_id: "piseiro-1",
        lyrics: "A sanfona chora, a poeira levanta\nA galera grita, a festa não espanta\nBota a bota no chão, deixa o corpo balançar\nÉ piseiro, meu irmão, até o dia clarear.",
    },
    Composition {
        id: "5",
        slug: "sofrimento-bom-por-tiago-reis",
        title: "Sofrimento Bom",
        artist: "Tiago Reis",
        genre: Genre::Arrocha,
        mood: "Sofrência",
        image_id: "arrocha-1",
        lyrics: "Me liga toda noite, diz que sente saudade\nMas de dia me ignora, que crueldade\nEsse teu jogo é um veneno, um sofrimento bom\nQue me prende e me excita ao som do mesmo som.",
    },
    Composition {
        id: "6",
        slug: "batidao-da-favela-por-dj-gabi",
        title: "Batidão da Favela",
        artist: "DJ Gabi",
        genre: Genre::Funk,
        mood: "Energético",
        image_id: "funk-1",
        lyrics: "O grave bate forte, a comunidade desce\nCorpos em movimento, a energia cresce\nÉ o som que vem da rua, a voz da periferia\nBatidão que te domina, pura ideologia.",
    },
    Composition {
        id: "7",
        slug: "raiz-sertaneja-por-bruno-e-marcelo",
        title: "Raiz Sertaneja",
        artist: "Bruno & Marcelo",
        genre: Genre::Sertanejo,
        mood: "Tradicional",
        image_id: "sertanejo-2",
        lyrics: "Chapéu na cabeça, bota empoeirada\nNo peito uma saudade, na viola uma toada\nSou filho desse chão, meu canto tem raiz\nSou sertanejo, sou feliz.",
    },
    Composition {
        id: "8",
        slug: "paz-no-coracao-por-irma-lucia",
        title: "Paz no Coração",
        artist: "Irmã Lúcia",
        genre: Genre::Gospel,
        mood: "Calmo",
        image_id: "gospel-2",
        lyrics: "Quando a angústia vem, eu fecho os meus olhos\nE sinto a paz que só Tu podes me dar\nUm rio de tranquilidade, afogando meus abrolhos\nEm Teus braços, Senhor, encontro meu lugar.",
    },
    Composition {
        id: "9",
        slug: "notas-de-cem-por-yung-d",
        title: "Notas de Cem",
        artist: "Yung D",
        genre: Genre::Trap,
        mood: "Ambicioso",
        image_id: "trap-2",
        lyrics: "Empilhando notas de cem, minha mente a mil\nNo jogo da vida, a vitória é meu fuzil\nNão durmo no ponto, meu tempo é meu capital\nFazendo história, do real ao digital.",
    },
    Composition {
        id: "10",
        slug: "chao-batido-por-os-pizeiros",
        title: "Chão Batido",
        artist: "Os Pizeiros",
        genre: Genre::Piseiro,
        mood: "Divertido",
        image_id: "piseiro-2",
        lyrics: "Fim de semana chegou, a galera animou\nCaminhonete na porta, o som já ligou\nDestino é o forró, no meio do sertão\nPiseiro a noite inteira, é pura curtição.",
    },
    Composition {
        id: "11",
        slug: "mensagem-apagada-por-julia-matos",
        title: "Mensagem Apagada",
        artist: "Júlia Matos",
        genre: Genre::Arrocha,
        mood: "Romântico",
        image_id: "arrocha-2",
        lyrics: "Você mandou 'eu te amo' e depois apagou\nMeu coração acelerou, mas a dúvida ficou\nMe diz o que você sente, não me deixe na incerteza\nEsse arrocha é pra você, com toda clareza.",
    },
    Composition {
        id: "12",
        slug: "ritmo-e-poesia-por-mc-consciente",
        title: "Ritmo e Poesia",
        artist: "MC Consciente",
        genre: Genre::Funk,
        mood: "Reflexivo",
        image_id: "funk-2",
        lyrics: "Não é só grave e batida, é ideia e visão\nFunk é ritmo e poesia, a voz da nação\nContando a realidade, sem maquiagem, sem caô\nA cultura que resiste e que nunca se entregou.",
    },
];

const fn image(id: &'static str, description: &'static str, image_url: &'static str, image_hint: &'static str) -> ImageRef {
    ImageRef { id, description, image_url, image_hint }
}

pub static PLACEHOLDER_IMAGES: &[ImageRef] = &[
    image("hero", "Crowd at a live concert under stage lights", "https://picsum.photos/seed/hero/1920/1080", "concert crowd"),
    image("sertanejo-1", "Dirt road at sunset", "https://picsum.photos/seed/sertanejo-1/600/400", "country road"),
    image("gospel-1", "Light through a church window", "https://picsum.photos/seed/gospel-1/600/400", "church light"),
    image("trap-1", "City skyline at night", "https://picsum.photos/seed/trap-1/600/400", "city night"),
    image("piseiro-1", "Accordion on a wooden stage", "https://picsum.photos/seed/piseiro-1/600/400", "accordion party"),
    image("arrocha-1", "Couple dancing close", "https://picsum.photos/seed/arrocha-1/600/400", "romantic dance"),
    image("funk-1", "Speakers at a street party", "https://picsum.photos/seed/funk-1/600/400", "street party"),
    image("sertanejo-2", "Acoustic guitar and cowboy hat", "https://picsum.photos/seed/sertanejo-2/600/400", "guitar hat"),
    image("gospel-2", "Calm lake at dawn", "https://picsum.photos/seed/gospel-2/600/400", "calm lake"),
    image("trap-2", "Stack of banknotes", "https://picsum.photos/seed/trap-2/600/400", "money stack"),
    image("piseiro-2", "Pickup truck at a countryside party", "https://picsum.photos/seed/piseiro-2/600/400", "countryside truck"),
    image("arrocha-2", "Phone screen with a deleted message", "https://picsum.photos/seed/arrocha-2/600/400", "phone message"),
    image("funk-2", "Microphone in a recording booth", "https://picsum.photos/seed/funk-2/600/400", "recording microphone"),
];
