use eigen_pca::PCA;
use ndarray::Array2;

fn main() {
    env_logger::init();

    let data = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();

    let mut pca = PCA::new();
    let scores = pca.fit_transform(&data, 1).expect("PCA fit failed");

    println!("Basis:\n{:?}", pca.basis().unwrap());
    println!("Scores (uncentered input):\n{:?}", scores);
}
