use ndarray::ArrayView2;

/// 可增长的行优先 f32 矩阵，用于累积多张图片的描述符
///
/// 每次追加都只扩展底层缓冲区，避免反复拼接整块矩阵。
#[derive(Debug)]
pub struct DescriptorPool {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl DescriptorPool {
    pub fn new(width: usize) -> Self {
        Self { width, height: 0, data: vec![] }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// 追加若干行，列数必须与矩阵宽度一致
    pub fn extend(&mut self, rows: ArrayView2<f32>) {
        assert_eq!(self.width, rows.ncols());
        self.data.reserve(rows.len());
        for row in rows.rows() {
            self.data.extend(row.iter());
        }
        self.height += rows.nrows();
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        ArrayView2::from_shape((self.height, self.width), &self.data)
            .expect("pool shape matches its buffer")
    }
}
