pub use lessonbook_models::evaluations::*;

pub const GRADES_HEADERS: [&str; 13] = [
    "N.º",
    "Nome",
    "Aulas avaliadas",
    "Atrasos",
    "Faltas",
    "Faltas disciplinares",
    "Responsabilidade",
    "Comportamento",
    "Participação",
    "Trabalho autónomo",
    "Portátil/Material",
    "Atividade",
    "Média",
];
